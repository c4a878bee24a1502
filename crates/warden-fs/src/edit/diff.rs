//! Structured unified diffs.

use std::fmt;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

const CONTEXT_LINES: usize = 3;

/// Zero-based span of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    /// Index of the first line.
    pub start: usize,
    /// Number of lines covered.
    pub len: usize,
}

impl LineRange {
    /// Creates a range of `len` lines beginning at `start`.
    #[must_use]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Start position as printed in a hunk header.
    ///
    /// Non-empty ranges are one-based; an empty range names the line it
    /// follows.
    #[must_use]
    pub const fn header_start(&self) -> usize {
        if self.len == 0 {
            self.start
        } else {
            self.start + 1
        }
    }
}

/// Role of a line within a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Unchanged line shown for context.
    Context,
    /// Line present only in the new text.
    Added,
    /// Line present only in the old text.
    Removed,
}

impl LineKind {
    const fn prefix(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Added => '+',
            Self::Removed => '-',
        }
    }
}

/// One line of a hunk, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    /// Context, added, or removed.
    pub kind: LineKind,
    /// Line text.
    pub content: String,
    /// The line ends its file without a trailing newline.
    pub missing_newline: bool,
}

/// A contiguous group of changes with surrounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    /// Lines covered in the old text.
    pub old_range: LineRange,
    /// Lines covered in the new text.
    pub new_range: LineRange,
    /// Context and changed lines in display order.
    pub lines: Vec<DiffLine>,
}

/// Line diff between two versions of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedDiff {
    path: String,
    hunks: Vec<Hunk>,
}

impl UnifiedDiff {
    /// Diffs `old` against `new`, labelling both sides with `path`.
    #[must_use]
    pub fn between(path: impl Into<String>, old: &str, new: &str) -> Self {
        let diff = TextDiff::from_lines(old, new);
        let hunks = diff
            .grouped_ops(CONTEXT_LINES)
            .iter()
            .filter_map(|group| {
                let first = group.first()?;
                let last = group.last()?;
                let old_span = first.old_range().start..last.old_range().end;
                let new_span = first.new_range().start..last.new_range().end;
                let lines = group
                    .iter()
                    .flat_map(|op| diff.iter_changes(op))
                    .map(|change| DiffLine {
                        kind: match change.tag() {
                            ChangeTag::Equal => LineKind::Context,
                            ChangeTag::Insert => LineKind::Added,
                            ChangeTag::Delete => LineKind::Removed,
                        },
                        content: change
                            .value()
                            .strip_suffix('\n')
                            .unwrap_or(change.value())
                            .to_owned(),
                        missing_newline: change.missing_newline(),
                    })
                    .collect();
                Some(Hunk {
                    old_range: LineRange::new(old_span.start, old_span.len()),
                    new_range: LineRange::new(new_span.start, new_span.len()),
                    lines,
                })
            })
            .collect();

        Self {
            path: path.into(),
            hunks,
        }
    }

    /// Label used in the `---`/`+++` headers.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Hunks in file order; empty when nothing changed.
    #[must_use]
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// True when both sides were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

/// Renders the diff in unified format; an empty diff renders as nothing.
impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hunks.is_empty() {
            return Ok(());
        }
        writeln!(f, "--- {}", self.path)?;
        writeln!(f, "+++ {}", self.path)?;
        for hunk in &self.hunks {
            writeln!(
                f,
                "@@ -{},{} +{},{} @@",
                hunk.old_range.header_start(),
                hunk.old_range.len,
                hunk.new_range.header_start(),
                hunk.new_range.len
            )?;
            for line in &hunk.lines {
                writeln!(f, "{}{}", line.kind.prefix(), line.content)?;
                if line.missing_newline {
                    writeln!(f, "\\ No newline at end of file")?;
                }
            }
        }
        Ok(())
    }
}
