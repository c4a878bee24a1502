//! Directory listings and trees.
//!
//! Symlinks found while listing are reported as files and never followed.

use std::cmp::Reverse;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::FsError;
use crate::resolver::ResolvedPath;

/// Whether a listed entry is a directory. Symbolic links count as files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file, symlink, or other non-directory.
    File,
    /// Directory.
    Directory,
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// File name of the child, without its parent path.
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Size in bytes; only present for files in sized listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::File => write!(f, "[FILE] {}", self.name),
            EntryKind::Directory => write!(f, "[DIR] {}", self.name),
        }
    }
}

/// Ordering for sized listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending by name.
    #[default]
    Name,
    /// Largest first, ties broken by name.
    Size,
}

/// A sized listing with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizedListing {
    /// Children in the requested order.
    pub entries: Vec<DirectoryEntry>,
    /// Number of non-directory entries.
    pub total_files: usize,
    /// Number of directory entries.
    pub total_directories: usize,
    /// Sum of the file sizes in bytes.
    pub total_size: u64,
}

/// Recursive view of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeEntry {
    /// A leaf entry. Symbolic links appear here and are never followed.
    File {
        /// Entry name.
        name: String,
    },
    /// A directory and everything below it.
    Directory {
        /// Entry name.
        name: String,
        /// Children sorted by name; empty for an empty directory.
        children: Vec<TreeEntry>,
    },
}

impl TreeEntry {
    /// Name of the entry, without its parent path.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name } | Self::Directory { name, .. } => name,
        }
    }
}

/// Lists the immediate children of `path`, sorted by name.
pub fn list_directory(path: &ResolvedPath) -> Result<Vec<DirectoryEntry>, FsError> {
    read_entries(path.as_path(), false)
}

/// Lists the immediate children of `path` with file sizes and totals.
pub fn list_with_sizes(path: &ResolvedPath, order: SortOrder) -> Result<SizedListing, FsError> {
    let mut entries = read_entries(path.as_path(), true)?;
    if order == SortOrder::Size {
        entries.sort_by_key(|entry| (Reverse(entry.size.unwrap_or(0)), entry.name.clone()));
    }

    let total_files = entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::File)
        .count();
    let total_size = entries.iter().filter_map(|entry| entry.size).sum();
    Ok(SizedListing {
        total_directories: entries.len() - total_files,
        total_files,
        total_size,
        entries,
    })
}

/// Builds the recursive tree rooted at `path`.
pub fn directory_tree(path: &ResolvedPath) -> Result<TreeEntry, FsError> {
    let path = path.as_path();
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    Ok(TreeEntry::Directory {
        name,
        children: tree_children(path)?,
    })
}

fn tree_children(directory: &Path) -> Result<Vec<TreeEntry>, FsError> {
    let mut children = Vec::new();
    for entry in read_entries(directory, false)? {
        children.push(match entry.kind {
            EntryKind::File => TreeEntry::File { name: entry.name },
            EntryKind::Directory => {
                let nested = tree_children(&directory.join(&entry.name))?;
                TreeEntry::Directory {
                    name: entry.name,
                    children: nested,
                }
            }
        });
    }
    Ok(children)
}

fn read_entries(directory: &Path, with_sizes: bool) -> Result<Vec<DirectoryEntry>, FsError> {
    let reader = fs::read_dir(directory).map_err(|err| FsError::read(directory, &err))?;
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|err| FsError::read(directory, &err))?;
        let file_type = entry
            .file_type()
            .map_err(|err| FsError::read(&entry.path(), &err))?;
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let size = if with_sizes && kind == EntryKind::File {
            let metadata = entry
                .metadata()
                .map_err(|err| FsError::read(&entry.path(), &err))?;
            Some(metadata.len())
        } else {
            None
        };
        entries.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
            size,
        });
    }
    entries.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_render_with_kind_prefix() {
        let file = DirectoryEntry {
            name: String::from("a.txt"),
            kind: EntryKind::File,
            size: None,
        };
        let dir = DirectoryEntry {
            name: String::from("src"),
            kind: EntryKind::Directory,
            size: None,
        };
        assert_eq!(file.to_string(), "[FILE] a.txt");
        assert_eq!(dir.to_string(), "[DIR] src");
    }

    #[test]
    fn tree_serialises_children_only_for_directories() {
        let tree = TreeEntry::Directory {
            name: String::from("root"),
            children: vec![
                TreeEntry::File {
                    name: String::from("a.txt"),
                },
                TreeEntry::Directory {
                    name: String::from("empty"),
                    children: Vec::new(),
                },
            ],
        };
        let value = serde_json::to_value(&tree).expect("serialise");
        assert_eq!(value["type"], "directory");
        assert_eq!(value["children"][0]["type"], "file");
        assert!(value["children"][0].get("children").is_none());
        assert_eq!(value["children"][1]["children"], serde_json::json!([]));
    }
}
