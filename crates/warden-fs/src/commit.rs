//! Crash-safe replacement of file contents.

use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::FsError;

const COMMIT_TARGET: &str = "warden_fs::commit";

/// Replaces the contents of `path` with `bytes` in a single rename.
///
/// The bytes are staged in a temporary file beside the target, flushed to
/// disk, given the target's existing permissions, and renamed into place.
/// Observers see either the old file or the new one. The parent directory
/// must already exist.
///
/// A symlink sitting at `path` is replaced rather than written through.
///
/// # Errors
///
/// Returns [`FsError::WriteFailed`] when any step fails; the target is left
/// as it was.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FsError> {
    let temp_file = prepare_file(path, bytes)?;
    temp_file
        .persist(path)
        .map_err(|err| FsError::write(path, &err.error))?;
    debug!(
        target: COMMIT_TARGET,
        path = %path.display(),
        bytes = bytes.len(),
        "committed file"
    );
    Ok(())
}

/// Stages `bytes` in a temporary file in the same directory as `path`.
///
/// Sharing the directory keeps the final rename on one filesystem.
fn prepare_file(path: &Path, bytes: &[u8]) -> Result<NamedTempFile, FsError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file =
        NamedTempFile::new_in(parent).map_err(|err| FsError::write(path, &err))?;
    temp_file
        .write_all(bytes)
        .map_err(|err| FsError::write(path, &err))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|err| FsError::write(path, &err))?;

    if let Ok(metadata) = fs::symlink_metadata(path)
        && metadata.is_file()
    {
        fs::set_permissions(temp_file.path(), metadata.permissions())
            .map_err(|err| FsError::write(path, &err))?;
    }

    Ok(temp_file)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn creates_new_files() {
        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("new.txt");
        write_atomic(&target, b"fresh").expect("write");
        assert_eq!(fs::read(&target).expect("read back"), b"fresh");
    }

    #[test]
    fn replaces_existing_files_without_leaving_temporaries() {
        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("file.txt");
        fs::write(&target, "old").expect("seed");

        write_atomic(&target, b"new").expect("write");

        assert_eq!(fs::read_to_string(&target).expect("read back"), "new");
        let entries = fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn missing_parent_is_a_write_failure() {
        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("absent/file.txt");
        let error = write_atomic(&target, b"x").expect_err("no parent");
        assert_eq!(error.kind(), ErrorKind::WriteFailed);
        assert!(!dir.path().join("absent").exists());
    }

    #[cfg(unix)]
    #[test]
    fn keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("script.sh");
        fs::write(&target, "#!/bin/sh\n").expect("seed");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o750)).expect("chmod");

        write_atomic(&target, b"#!/bin/sh\nexit 0\n").expect("write");

        let mode = fs::metadata(&target).expect("stat").permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn replaces_symlinks_instead_of_following_them() {
        let dir = TempDir::new().expect("temp dir");
        let victim = dir.path().join("victim.txt");
        fs::write(&victim, "untouched").expect("seed victim");
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&victim, &link).expect("symlink");

        write_atomic(&link, b"replacement").expect("write");

        assert_eq!(fs::read_to_string(&victim).expect("victim"), "untouched");
        assert!(!fs::symlink_metadata(&link).expect("lstat").file_type().is_symlink());
        assert_eq!(fs::read_to_string(&link).expect("link"), "replacement");
    }
}
