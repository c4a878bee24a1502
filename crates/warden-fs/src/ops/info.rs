//! File metadata.

use std::fs::{self, Metadata};
use std::io;
use std::time::SystemTime;

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::FsError;
use crate::resolver::ResolvedPath;

/// Metadata of a single path.
///
/// Timestamps are RFC 3339 in UTC and absent where the platform does not
/// record them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    /// Length in bytes.
    pub size: u64,
    /// Creation time, where the filesystem records one.
    pub created: Option<String>,
    /// Last modification time.
    pub modified: Option<String>,
    /// Last access time.
    pub accessed: Option<String>,
    /// The target is a regular file.
    pub is_file: bool,
    /// The target is a directory.
    pub is_directory: bool,
    /// The caller's path named a symbolic link; the other fields describe
    /// its target.
    pub is_symlink: bool,
    /// Permission bits in octal, such as `644`. Reports `readonly` or
    /// `readwrite` on platforms without mode bits.
    pub permissions: String,
}

/// Reads metadata for `path`, following a final symbolic link.
///
/// # Errors
///
/// [`FsError::NotFound`] when the path is missing and
/// [`FsError::NotReadable`] when its metadata cannot be read.
pub fn file_info(path: &ResolvedPath) -> Result<FileInfo, FsError> {
    let metadata = fs::metadata(path.as_path()).map_err(|err| FsError::read(path.as_path(), &err))?;
    Ok(FileInfo {
        size: metadata.len(),
        created: timestamp(metadata.created()),
        modified: timestamp(metadata.modified()),
        accessed: timestamp(metadata.accessed()),
        is_file: metadata.is_file(),
        is_directory: metadata.is_dir(),
        is_symlink: path.via_symlink(),
        permissions: permissions(&metadata),
    })
}

fn timestamp(time: io::Result<SystemTime>) -> Option<String> {
    let time = time.ok()?;
    OffsetDateTime::from(time).format(&Rfc3339).ok()
}

#[cfg(unix)]
fn permissions(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    format!("{:o}", metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        String::from("readonly")
    } else {
        String::from("readwrite")
    }
}
