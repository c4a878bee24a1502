//! Recursive name search.

use std::path::PathBuf;

use tracing::warn;
use walkdir::WalkDir;

use super::OPS_TARGET;
use crate::error::FsError;
use crate::resolver::ResolvedPath;

/// Finds entries below `root` whose names contain `pattern`, ignoring case.
///
/// Symlinks are reported when their own name matches but are never
/// descended into. Unreadable subtrees are skipped with a warning.
pub fn search(root: &ResolvedPath, pattern: &str) -> Result<Vec<PathBuf>, FsError> {
    if pattern.is_empty() {
        return Err(FsError::invalid_argument("search pattern must not be empty"));
    }
    let needle = pattern.to_lowercase();

    let mut matches = Vec::new();
    let walker = WalkDir::new(root.as_path())
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    target: OPS_TARGET,
                    path = ?err.path(),
                    error = %err,
                    "skipping unreadable entry during search"
                );
                continue;
            }
        };
        if entry
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .contains(&needle)
        {
            matches.push(entry.into_path());
        }
    }
    Ok(matches)
}
