//! Path confinement: maps caller-supplied paths onto the allowed roots.
//!
//! Every operation resolves its paths afresh. A [`ResolvedPath`] is neither
//! `Clone` nor serialisable, so a validated path cannot be stashed and reused
//! by a later call after the tree has changed underneath it.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::FsError;
use crate::paths::{absolutise, expand_home, normalise_lexical};
use crate::roots::AllowedRoots;

const RESOLVER_TARGET: &str = "warden_fs::resolver";

/// Upper bound on symlinks followed while resolving one path, as `ELOOP` does.
const MAX_SYMLINK_HOPS: usize = 40;

/// An absolute, symlink-free path proven to lie within an allowed root.
///
/// Only [`PathResolver`] constructs values of this type.
#[derive(Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    exists: bool,
    via_symlink: bool,
}

impl ResolvedPath {
    /// The resolved absolute path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether every component existed when the path was resolved.
    #[must_use]
    pub fn existed(&self) -> bool {
        self.exists
    }

    /// Whether the candidate's final component was a symbolic link.
    #[must_use]
    pub fn via_symlink(&self) -> bool {
        self.via_symlink
    }

    /// Consumes the wrapper and returns the inner path.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Resolves candidate paths against an [`AllowedRoots`] set.
///
/// Relative candidates are anchored at a base directory fixed when the
/// resolver is built. The resolver only reads metadata (`lstat`,
/// `readlink`); it never creates or modifies anything.
#[derive(Debug, Clone)]
pub struct PathResolver {
    roots: AllowedRoots,
    base: Option<PathBuf>,
}

impl PathResolver {
    /// Builds a resolver that anchors relative candidates at `base`.
    ///
    /// `base` should be absolute; a relative base is normalised but relative
    /// candidates joined onto it will then fail confinement.
    #[must_use]
    pub fn new(roots: AllowedRoots, base: impl Into<PathBuf>) -> Self {
        Self {
            roots,
            base: Some(normalise_lexical(&base.into())),
        }
    }

    /// Builds a resolver that rejects relative candidates outright.
    #[must_use]
    pub fn without_base(roots: AllowedRoots) -> Self {
        Self { roots, base: None }
    }

    /// The allow-list this resolver enforces.
    #[must_use]
    pub fn roots(&self) -> &AllowedRoots {
        &self.roots
    }

    /// Resolves `candidate`, allowing the trailing components not to exist.
    ///
    /// Use this for operations that may create the target.
    ///
    /// # Errors
    ///
    /// [`FsError::InvalidArgument`] for empty candidates, candidates with NUL
    /// bytes, and relative candidates without a base;
    /// [`FsError::OutsideAllowedRoots`] when the real path escapes every root;
    /// [`FsError::NotReadable`] when metadata cannot be read or a symlink loop
    /// is detected.
    pub fn resolve(&self, candidate: &str) -> Result<ResolvedPath, FsError> {
        let absolute = self.absolute_candidate(candidate)?;
        let lexical = normalise_lexical(&absolute);
        let Walk {
            path: real,
            exists,
            via_symlink,
        } = real_path(&lexical)?;

        if !self.roots.contains(&real) {
            warn!(
                target: RESOLVER_TARGET,
                candidate,
                resolved = %real.display(),
                "rejected path outside allowed directories"
            );
            return Err(FsError::OutsideAllowedRoots {
                path: candidate.to_owned(),
            });
        }

        debug!(
            target: RESOLVER_TARGET,
            candidate,
            resolved = %real.display(),
            exists,
            "resolved path"
        );
        Ok(ResolvedPath {
            path: real,
            exists,
            via_symlink,
        })
    }

    /// Resolves `candidate` and requires the target to exist.
    ///
    /// # Errors
    ///
    /// As [`PathResolver::resolve`], plus [`FsError::NotFound`] when any
    /// component is missing.
    pub fn resolve_existing(&self, candidate: &str) -> Result<ResolvedPath, FsError> {
        let resolved = self.resolve(candidate)?;
        if resolved.exists {
            Ok(resolved)
        } else {
            Err(FsError::NotFound {
                path: resolved.path,
            })
        }
    }

    fn absolute_candidate(&self, candidate: &str) -> Result<PathBuf, FsError> {
        if candidate.is_empty() {
            return Err(FsError::invalid_argument("path must not be empty"));
        }
        if candidate.contains('\0') {
            return Err(FsError::invalid_argument("path must not contain NUL bytes"));
        }

        let expanded = expand_home(Path::new(candidate));
        if expanded.is_absolute() {
            return Ok(expanded);
        }
        match &self.base {
            Some(base) => Ok(absolutise(base, &expanded)),
            None => Err(FsError::invalid_argument(format!(
                "relative path {candidate} is not accepted here"
            ))),
        }
    }
}

struct Walk {
    path: PathBuf,
    exists: bool,
    via_symlink: bool,
}

enum Step {
    Parent,
    Name(OsString),
}

/// Walks `lexical` one component at a time, following every symlink.
///
/// Once a component is missing
/// the remainder is appended lexically, so not-yet-created targets still get
/// a meaningful location.
fn real_path(lexical: &Path) -> Result<Walk, FsError> {
    let mut resolved = anchor(lexical);
    let mut pending = Vec::new();
    splice(&mut pending, lexical);

    let mut hops = 0;
    let mut exists = true;
    let mut via_symlink = false;
    while let Some(step) = pending.pop() {
        let name = match step {
            Step::Parent => {
                resolved.pop();
                continue;
            }
            Step::Name(name) => name,
        };

        let next = resolved.join(&name);
        if !exists {
            resolved = next;
            continue;
        }

        match fs::symlink_metadata(&next) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(FsError::NotReadable {
                        path: next,
                        message: String::from("too many levels of symbolic links"),
                    });
                }
                let target = fs::read_link(&next).map_err(|error| FsError::read(&next, &error))?;
                if pending.is_empty() {
                    via_symlink = true;
                }
                if target.has_root() {
                    resolved = anchor(&target);
                }
                splice(&mut pending, &target);
            }
            Ok(_) => resolved = next,
            Err(error) if is_missing(&error) => {
                exists = false;
                resolved = next;
            }
            Err(error) => return Err(FsError::read(&next, &error)),
        }
    }

    Ok(Walk {
        path: resolved,
        exists,
        via_symlink,
    })
}

/// Leading prefix and root components of `path`.
fn anchor(path: &Path) -> PathBuf {
    path.components()
        .take_while(|component| matches!(component, Component::Prefix(_) | Component::RootDir))
        .collect()
}

/// Queues the components of `path` so they are processed before anything
/// already pending.
fn splice(pending: &mut Vec<Step>, path: &Path) {
    let steps: Vec<Step> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(Step::Name(name.to_os_string())),
            Component::ParentDir => Some(Step::Parent),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();
    pending.extend(steps.into_iter().rev());
}

fn is_missing(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
