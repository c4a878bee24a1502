//! Service object tying the resolver to the operations.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::edit::{self, EditOperation, EditResult};
use crate::error::FsError;
use crate::ops::{
    self, DirectoryEntry, FileInfo, MediaContent, ReadOutcome, ReadWindow, SizedListing,
    SortOrder, TreeEntry,
};
use crate::resolver::{PathResolver, ResolvedPath};
use crate::roots::AllowedRoots;

const SANDBOX_TARGET: &str = "warden_fs::ops";

/// Filesystem operations confined to a set of allowed directories.
///
/// A `Sandbox` holds only immutable state and is shared freely between
/// threads. Each call resolves its path arguments on entry and performs I/O
/// only through the resolved paths.
#[derive(Debug, Clone)]
pub struct Sandbox {
    resolver: PathResolver,
}

impl Sandbox {
    /// Creates a sandbox anchoring relative paths at `base`.
    #[must_use]
    pub fn new(roots: AllowedRoots, base: impl Into<PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(roots, base),
        }
    }

    /// Creates a sandbox that only accepts absolute paths.
    #[must_use]
    pub fn without_base(roots: AllowedRoots) -> Self {
        Self {
            resolver: PathResolver::without_base(roots),
        }
    }

    /// The allowed directories.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        self.resolver.roots().as_slice()
    }

    /// Resolves `path` without touching its contents.
    ///
    /// # Errors
    ///
    /// See [`PathResolver::resolve`].
    pub fn resolve(&self, path: &str) -> Result<ResolvedPath, FsError> {
        self.resolver.resolve(path)
    }

    /// Reads a text file, or its first or last lines.
    ///
    /// # Errors
    ///
    /// Resolution errors, [`FsError::NotFound`], [`FsError::NotReadable`],
    /// and [`FsError::NotText`].
    pub fn read_text(&self, path: &str, window: ReadWindow) -> Result<String, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        ops::read_text(&resolved, window)
    }

    /// Reads several text files, reporting failures per file.
    ///
    /// Results keep the order of `paths`; one failing file does not stop the
    /// others.
    #[must_use]
    pub fn read_multiple<S: AsRef<str>>(&self, paths: &[S]) -> Vec<ReadOutcome> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                ReadOutcome {
                    path: path.to_owned(),
                    result: self.read_text(path, ReadWindow::All),
                }
            })
            .collect()
    }

    /// Reads a file as base64 with a MIME type.
    ///
    /// # Errors
    ///
    /// Resolution errors, [`FsError::NotFound`], and [`FsError::NotReadable`].
    pub fn read_media(&self, path: &str) -> Result<MediaContent, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        ops::read_media(&resolved)
    }

    /// Creates or replaces a file with exactly `content`.
    ///
    /// # Errors
    ///
    /// Resolution errors and [`FsError::WriteFailed`].
    pub fn write_text(&self, path: &str, content: &str) -> Result<(), FsError> {
        let resolved = self.resolver.resolve(path)?;
        ops::write_text(&resolved, content)?;
        debug!(
            target: SANDBOX_TARGET,
            path = %resolved,
            bytes = content.len(),
            "wrote file"
        );
        Ok(())
    }

    /// Applies an ordered batch of edits, previewing only when `dry_run`.
    ///
    /// # Errors
    ///
    /// See [`edit::apply_edits`].
    pub fn apply_edits(
        &self,
        path: &str,
        edits: &[EditOperation],
        dry_run: bool,
    ) -> Result<EditResult, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        edit::apply_edits(&resolved, edits, dry_run)
    }

    /// Creates a directory and its missing parents.
    ///
    /// # Errors
    ///
    /// Resolution errors and [`FsError::WriteFailed`].
    pub fn create_directory(&self, path: &str) -> Result<(), FsError> {
        let resolved = self.resolver.resolve(path)?;
        ops::create_directory(&resolved)
    }

    /// Moves or renames `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Resolution errors on either path, [`FsError::NotFound`] for a missing
    /// source, [`FsError::AlreadyExists`], and [`FsError::WriteFailed`].
    pub fn move_path(&self, source: &str, destination: &str) -> Result<(), FsError> {
        let source = self.resolver.resolve_existing(source)?;
        let destination = self.resolver.resolve(destination)?;
        ops::move_path(&source, &destination)
    }

    /// Lists a directory's immediate children.
    ///
    /// # Errors
    ///
    /// Resolution errors, [`FsError::NotFound`], and [`FsError::NotReadable`].
    pub fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        ops::list_directory(&resolved)
    }

    /// Lists a directory's immediate children with sizes and totals.
    ///
    /// # Errors
    ///
    /// As [`Sandbox::list_directory`].
    pub fn list_with_sizes(&self, path: &str, order: SortOrder) -> Result<SizedListing, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        ops::list_with_sizes(&resolved, order)
    }

    /// Builds a recursive tree of a directory.
    ///
    /// # Errors
    ///
    /// As [`Sandbox::list_directory`].
    pub fn directory_tree(&self, path: &str) -> Result<TreeEntry, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        ops::directory_tree(&resolved)
    }

    /// Searches below `path` for names containing `pattern`.
    ///
    /// # Errors
    ///
    /// Resolution errors, [`FsError::NotFound`], and
    /// [`FsError::InvalidArgument`] for an empty pattern.
    pub fn search(&self, path: &str, pattern: &str) -> Result<Vec<PathBuf>, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        ops::search(&resolved, pattern)
    }

    /// Returns metadata for a path.
    ///
    /// # Errors
    ///
    /// Resolution errors, [`FsError::NotFound`], and [`FsError::NotReadable`].
    pub fn file_info(&self, path: &str) -> Result<FileInfo, FsError> {
        let resolved = self.resolver.resolve_existing(path)?;
        ops::file_info(&resolved)
    }

    /// Returns true when `path` lies within an allowed directory.
    ///
    /// `path` must be absolute and symlink-free.
    #[must_use]
    pub fn is_allowed(&self, path: &Path) -> bool {
        self.resolver.roots().contains(path)
    }
}
