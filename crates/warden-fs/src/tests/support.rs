//! Shared fixtures for sandbox tests.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempDir;

use crate::roots::AllowedRoots;
use crate::sandbox::Sandbox;

/// A temporary tree with one allowed root and a sibling outside it.
pub struct Workspace {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub outside: PathBuf,
    pub sandbox: Sandbox,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to allocate temporary directory");
        let base = fs::canonicalize(temp_dir.path()).expect("canonical temp dir");
        let root = base.join("allowed");
        let outside = base.join("outside");
        fs::create_dir(&root).expect("create allowed root");
        fs::create_dir(&outside).expect("create outside directory");
        fs::write(outside.join("secret.txt"), "top secret\n").expect("write secret");

        let roots = AllowedRoots::new([&root]).expect("roots");
        let sandbox = Sandbox::new(roots, &root);
        Self {
            _temp_dir: temp_dir,
            root,
            outside,
            sandbox,
        }
    }

    /// Writes a fixture file below the root, creating parents.
    pub fn seed(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parent");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    /// Absolute path below the root, as a string for sandbox calls.
    pub fn abs(&self, relative: &str) -> String {
        self.root.join(relative).display().to_string()
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.root.join(relative)).expect("read fixture")
    }

    #[cfg(unix)]
    pub fn symlink(&self, target: impl AsRef<Path>, relative: &str) {
        std::os::unix::fs::symlink(target, self.root.join(relative)).expect("create symlink");
    }
}

/// SHA-256 of a file, used to prove a file was left untouched.
pub fn checksum(path: &Path) -> Vec<u8> {
    let bytes = fs::read(path).expect("read for checksum");
    Sha256::digest(bytes).to_vec()
}

/// Names of every entry in `directory`.
pub fn entry_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .expect("list directory")
        .map(|entry| {
            entry
                .expect("directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
