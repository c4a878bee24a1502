//! The immutable set of directories every operation is confined to.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::FsError;
use crate::paths::{expand_home, is_within};

const ROOTS_TARGET: &str = "warden_fs::roots";

/// Canonicalised allow-list of root directories.
///
/// Built once at startup and shared read-only afterwards; clones share the
/// same storage. Every entry is an absolute, symlink-free directory path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRoots {
    roots: Arc<[PathBuf]>,
}

impl AllowedRoots {
    /// Canonicalises `directories` into a root set.
    ///
    /// Each entry has a leading `~` expanded, is resolved through any
    /// symlinks, and must name an existing directory. Exact duplicates are
    /// dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::InvalidRoot`] for an entry that does not exist or is
    /// not a directory, and [`FsError::NoAllowedRoots`] when nothing remains.
    pub fn new<I, P>(directories: I) -> Result<Self, FsError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut roots: Vec<PathBuf> = Vec::new();
        for directory in directories {
            let canonical = canonical_directory(directory.as_ref())?;
            if !roots.contains(&canonical) {
                debug!(
                    target: ROOTS_TARGET,
                    root = %canonical.display(),
                    "allowed directory registered"
                );
                roots.push(canonical);
            }
        }

        if roots.is_empty() {
            return Err(FsError::NoAllowedRoots);
        }
        Ok(Self {
            roots: roots.into(),
        })
    }

    /// The canonical roots in registration order.
    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Iterates over the canonical roots.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }

    /// Returns true when `path` equals or descends from any root.
    ///
    /// `path` must already be absolute and symlink-free for the answer to be
    /// meaningful.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.find_root(path).is_some()
    }

    /// Returns the root containing `path`, preferring the most specific one.
    #[must_use]
    pub fn find_root(&self, path: &Path) -> Option<&Path> {
        self.iter()
            .filter(|root| is_within(path, root))
            .max_by_key(|root| root.components().count())
    }
}

fn canonical_directory(path: &Path) -> Result<PathBuf, FsError> {
    let expanded = expand_home(path);
    let canonical = fs::canonicalize(&expanded).map_err(|error| FsError::InvalidRoot {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    if !canonical.is_dir() {
        return Err(FsError::InvalidRoot {
            path: path.to_path_buf(),
            message: String::from("not a directory"),
        });
    }
    Ok(canonical)
}
