//! Line-based edit engine.
//!
//! An edit batch is matched against an LF-normalised copy of the file, so
//! callers never need to know whether a file uses `\n` or `\r\n`. Before
//! writing, unchanged lines get their original terminators back and edited
//! lines take the file's dominant ending.
//! Either every edit in a batch applies or the file is left untouched.

mod diff;
mod matcher;

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use diff::{DiffLine, Hunk, LineKind, LineRange, UnifiedDiff};

use crate::commit::write_atomic;
use crate::error::FsError;
use crate::resolver::ResolvedPath;
use crate::text::{decode, dominant_line_ending, restore_line_endings, to_lf};

const EDIT_TARGET: &str = "warden_fs::edit";

/// Replace the first occurrence of `old_text` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOperation {
    /// Text to find. Must not be empty.
    #[serde(alias = "old_text")]
    pub old_text: String,
    /// Replacement; empty deletes the match.
    #[serde(alias = "new_text")]
    pub new_text: String,
}

impl EditOperation {
    /// Builds an edit from its match and replacement text.
    #[must_use]
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }
}

/// Outcome of an edit batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResult {
    content: String,
    dry_run: bool,
    diff: UnifiedDiff,
}

impl EditResult {
    /// File content after the edits, in the file's line-ending convention.
    ///
    /// For dry runs this is what would have been written.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True when nothing was written.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Diff from the original content to [`Self::content`].
    #[must_use]
    pub fn diff(&self) -> &UnifiedDiff {
        &self.diff
    }

    /// True when the edits changed the file content.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.diff.is_empty()
    }
}

/// Applies `edits` to the file at `path`.
///
/// When `dry_run` is false and the content changed, the file is replaced
/// atomically. Dry runs read the file and nothing else.
///
/// # Errors
///
/// [`FsError::NotFound`] or [`FsError::NotReadable`] when the file cannot be
/// read, [`FsError::NotText`] for binary content,
/// [`FsError::InvalidArgument`] for an edit with empty `old_text`,
/// [`FsError::UnmatchedEdit`] when an edit matches nothing, and
/// [`FsError::WriteFailed`] when the commit fails.
pub fn apply_edits(
    path: &ResolvedPath,
    edits: &[EditOperation],
    dry_run: bool,
) -> Result<EditResult, FsError> {
    let path = path.as_path();
    let bytes = fs::read(path).map_err(|err| FsError::read(path, &err))?;
    let original = decode(path, bytes)?;
    let line_ending = dominant_line_ending(&original);
    let normalised = to_lf(&original);

    let updated = matcher::apply_in_order(path, &normalised, edits)?;
    let diff = UnifiedDiff::between(path.display().to_string(), &normalised, &updated);
    let content = restore_line_endings(&original, &updated, line_ending);

    if dry_run {
        debug!(
            target: EDIT_TARGET,
            path = %path.display(),
            edits = edits.len(),
            hunks = diff.hunks().len(),
            "previewed edits"
        );
    } else if updated != normalised {
        write_atomic(path, content.as_bytes())?;
        debug!(
            target: EDIT_TARGET,
            path = %path.display(),
            edits = edits.len(),
            hunks = diff.hunks().len(),
            "applied edits"
        );
    }

    Ok(EditResult {
        content,
        dry_run,
        diff,
    })
}
