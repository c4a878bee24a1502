//! Filesystem operations confined to a fixed set of directories.
//!
//! The `warden-fs` crate lets an untrusted caller read, write, search, and
//! edit files while guaranteeing that every path it touches lies inside an
//! allow-list of root directories. Confinement holds in the presence of
//! `..` segments, symlinked ancestors, dangling symlinks, and prefix tricks
//! such as `/allowedfoo` against `/allowed`.
//!
//! Paths are validated by a [`PathResolver`], which follows every symlink
//! component by component and yields a [`ResolvedPath`]. Operations only
//! accept resolved paths, and the [`Sandbox`] facade resolves afresh on every
//! call, so a path validated once is never trusted later. Writes go through a
//! temporary file and a rename, so readers never observe a partial file.
//!
//! ```no_run
//! use warden_fs::{AllowedRoots, EditOperation, Sandbox};
//!
//! # fn main() -> Result<(), warden_fs::FsError> {
//! let roots = AllowedRoots::new(["/srv/project"])?;
//! let sandbox = Sandbox::new(roots, "/srv/project");
//!
//! let edits = [EditOperation::new("old_name", "new_name")];
//! let preview = sandbox.apply_edits("src/lib.rs", &edits, true)?;
//! print!("{}", preview.diff());
//! # Ok(()) }
//! ```

mod commit;
pub mod edit;
mod error;
pub mod ops;
pub mod paths;
mod resolver;
mod roots;
mod sandbox;
mod text;

#[cfg(test)]
mod tests;

pub use commit::write_atomic;
pub use edit::{EditOperation, EditResult, UnifiedDiff, apply_edits};
pub use error::{ErrorKind, FsError};
pub use resolver::{PathResolver, ResolvedPath};
pub use roots::AllowedRoots;
pub use sandbox::Sandbox;
