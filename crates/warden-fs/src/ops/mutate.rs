//! Whole-file writes, directory creation, and moves.

use std::fs;

use tracing::debug;

use super::OPS_TARGET;
use crate::commit::write_atomic;
use crate::error::FsError;
use crate::resolver::ResolvedPath;

/// Replaces the file at `path` with `content`, byte for byte.
pub fn write_text(path: &ResolvedPath, content: &str) -> Result<(), FsError> {
    write_atomic(path.as_path(), content.as_bytes())
}

/// Creates `path` and any missing parents. Existing directories are fine.
pub fn create_directory(path: &ResolvedPath) -> Result<(), FsError> {
    let path = path.as_path();
    fs::create_dir_all(path).map_err(|err| FsError::write(path, &err))?;
    debug!(target: OPS_TARGET, path = %path.display(), "created directory");
    Ok(())
}

/// Renames `source` to `destination`, refusing to overwrite.
pub fn move_path(source: &ResolvedPath, destination: &ResolvedPath) -> Result<(), FsError> {
    let from = source.as_path();
    let to = destination.as_path();
    if fs::symlink_metadata(to).is_ok() {
        return Err(FsError::AlreadyExists {
            path: to.to_path_buf(),
        });
    }
    fs::rename(from, to).map_err(|err| FsError::write(to, &err))?;
    debug!(
        target: OPS_TARGET,
        from = %from.display(),
        to = %to.display(),
        "moved path"
    );
    Ok(())
}
