//! Locates edit targets in a buffer and splices in replacements.

use std::ops::Range;
use std::path::Path;

use super::EditOperation;
use crate::error::FsError;
use crate::text::to_lf;

const SNIPPET_CHARS: usize = 60;

/// Applies `edits` in order to an LF-only `content` buffer.
///
/// Each edit searches the buffer as left by the previous edits. An exact
/// substring match is preferred; failing that, a window of whole lines is
/// matched with whitespace normalised. Within each tier the first match that
/// does not overlap text written by an earlier edit is taken, and an
/// overlapping match is used only when nothing else matches. The first edit
/// that matches nothing aborts the batch.
pub(crate) fn apply_in_order(
    path: &Path,
    content: &str,
    edits: &[EditOperation],
) -> Result<String, FsError> {
    let mut buffer = content.to_owned();
    let mut consumed = ConsumedSpans::default();

    for (index, edit) in edits.iter().enumerate() {
        let search = to_lf(&edit.old_text);
        let replace = to_lf(&edit.new_text);
        if search.is_empty() {
            return Err(FsError::invalid_argument(format!(
                "edit {index} has an empty old_text"
            )));
        }

        let (range, replacement) =
            if let Some(range) = consumed.pick(exact_matches(&buffer, &search)) {
                (range, replace)
            } else if let Some(found) = pick_window(&consumed, normalised_windows(&buffer, &search))
            {
                let replacement = reindent(strip_final_newline(&replace), found.indent);
                let end = if replacement.is_empty() && buffer[found.end..].starts_with('\n') {
                    found.end + 1
                } else {
                    found.end
                };
                (found.start..end, replacement)
            } else {
                return Err(FsError::UnmatchedEdit {
                    path: path.to_path_buf(),
                    index,
                    snippet: snippet(&edit.old_text),
                });
            };

        buffer.replace_range(range.clone(), &replacement);
        consumed.record(range, replacement.len());
    }

    Ok(buffer)
}

/// Byte spans of the buffer written by earlier edits in the batch.
#[derive(Debug, Default)]
struct ConsumedSpans(Vec<Range<usize>>);

impl ConsumedSpans {
    fn overlaps(&self, candidate: &Range<usize>) -> bool {
        self.0
            .iter()
            .any(|span| candidate.start < span.end && span.start < candidate.end)
    }

    /// First candidate clear of consumed text, else the first candidate.
    fn pick(&self, candidates: Vec<Range<usize>>) -> Option<Range<usize>> {
        let fresh = candidates.iter().position(|c| !self.overlaps(c));
        candidates.into_iter().nth(fresh.unwrap_or(0))
    }

    /// Records that `replaced` now holds `inserted` bytes of new text.
    ///
    /// Later spans shift by the length change; spans touching the splice
    /// merge into it.
    fn record(&mut self, replaced: Range<usize>, inserted: usize) {
        let new_end = replaced.start + inserted;
        let shift = |offset: usize| offset - replaced.end + new_end;
        let mut merged = replaced.start..new_end;
        let mut spans = Vec::with_capacity(self.0.len() + 1);

        for span in self.0.drain(..) {
            if span.end <= replaced.start {
                spans.push(span);
            } else if span.start >= replaced.end {
                spans.push(shift(span.start)..shift(span.end));
            } else {
                merged.start = merged.start.min(span.start);
                let end = if span.end > replaced.end {
                    shift(span.end)
                } else {
                    new_end
                };
                merged.end = merged.end.max(end);
            }
        }

        if !merged.is_empty() {
            spans.push(merged);
        }
        spans.sort_by_key(|span| span.start);
        self.0 = spans;
    }
}

/// Every start offset of `search` in `buffer`, overlapping hits included.
fn exact_matches(buffer: &str, search: &str) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(offset) = buffer[from..].find(search) {
        let start = from + offset;
        found.push(start..start + search.len());
        from = start + buffer[start..].chars().next().map_or(1, char::len_utf8);
    }
    found
}

fn pick_window<'a>(
    consumed: &ConsumedSpans,
    windows: Vec<LineWindow<'a>>,
) -> Option<LineWindow<'a>> {
    let fresh = windows
        .iter()
        .position(|window| !consumed.overlaps(&(window.start..window.end)));
    windows.into_iter().nth(fresh.unwrap_or(0))
}

/// Byte span of a whole-line window and the indentation of its first line.
#[derive(Debug, PartialEq, Eq)]
struct LineWindow<'a> {
    start: usize,
    end: usize,
    indent: &'a str,
}

/// Finds every window of lines equal to `search` modulo whitespace, in
/// buffer order.
///
/// Each span runs from the start of the first line to the end of the last
/// one, excluding its terminator.
fn normalised_windows<'a>(content: &'a str, search: &str) -> Vec<LineWindow<'a>> {
    let wanted: Vec<String> = strip_final_newline(search)
        .split('\n')
        .map(collapse_whitespace)
        .collect();
    if wanted.iter().all(String::is_empty) {
        return Vec::new();
    }

    let lines = line_spans(content);
    let width = wanted.len();
    if lines.len() < width {
        return Vec::new();
    }

    (0..=lines.len() - width)
        .filter_map(|first| {
            let window = &lines[first..first + width];
            let matches = window
                .iter()
                .zip(&wanted)
                .all(|(&(start, end), want)| collapse_whitespace(&content[start..end]) == *want);
            matches.then(|| {
                let (start, first_end) = window[0];
                let (_, end) = window[width - 1];
                LineWindow {
                    start,
                    end,
                    indent: leading_indent(&content[start..first_end]),
                }
            })
        })
        .collect()
}

/// Start and end offsets of every line, terminators excluded.
fn line_spans(content: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in content.split('\n') {
        spans.push((start, start + line.len()));
        start += line.len() + 1;
    }
    spans
}

/// Trims a line and collapses each internal whitespace run to one space.
fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn leading_indent(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

fn strip_final_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Moves `replacement` to `indent`, preserving its relative indentation.
///
/// Blank lines are emitted empty.
fn reindent(replacement: &str, indent: &str) -> String {
    let common = replacement
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_indent(line).len())
        .min()
        .unwrap_or(0);

    replacement
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{}", &line[common..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::ErrorKind;

    fn apply(content: &str, edits: &[(&str, &str)]) -> Result<String, FsError> {
        let edits: Vec<EditOperation> = edits
            .iter()
            .map(|(old, new)| EditOperation::new(*old, *new))
            .collect();
        apply_in_order(Path::new("file.txt"), content, &edits)
    }

    #[rstest]
    #[case::exact("alpha\nbeta\ngamma\n", &[("beta", "delta")], "alpha\ndelta\ngamma\n")]
    #[case::first_occurrence("one two one two", &[("one", "ONE")], "ONE two one two")]
    #[case::sees_previous_edits(
        "one two one two",
        &[("one", "ONE"), ("one", "UNO")],
        "ONE two UNO two"
    )]
    #[case::chained("a", &[("a", "b"), ("b", "c")], "c")]
    #[case::skips_inserted_text("x x\n", &[("x", "xy"), ("x", "z")], "xy z\n")]
    #[case::skips_every_earlier_insert("x x x", &[("x", "xx"), ("x", "y"), ("x", "z")], "xx y z")]
    #[case::spans_follow_later_splices(
        "aaa b b",
        &[("b", "bb"), ("aaa", "a"), ("b", "c")],
        "a bb c"
    )]
    #[case::reuses_inserted_text_when_nothing_else_matches(
        "ab ab",
        &[("ab", "ab!"), ("ab", "X"), ("ab", "Y")],
        "Y! X"
    )]
    #[case::crlf_in_edit_text("x\ny\n", &[("x\r\ny", "z")], "z\n")]
    fn applies_exact_matches(
        #[case] content: &str,
        #[case] edits: &[(&str, &str)],
        #[case] expected: &str,
    ) {
        assert_eq!(apply(content, edits).expect("apply"), expected);
    }

    #[test]
    fn falls_back_to_whitespace_normalised_lines() {
        let content = "fn main() {\n    let  x =   1;\n    run(x);\n}\n";
        let result = apply(content, &[("let x = 1;\nrun(x);", "let y = 2;\nrun(y);")])
            .expect("apply");
        assert_eq!(result, "fn main() {\n    let y = 2;\n    run(y);\n}\n");
    }

    #[test]
    fn reindents_relative_to_first_matched_line() {
        let content = "impl A {\n        fn f() {}\n}\n";
        let result = apply(
            content,
            &[("fn f() {}", "  fn f() {\n      body();\n  }")],
        );
        // The exact match wins here, so the replacement is spliced verbatim.
        assert_eq!(
            result.expect("apply"),
            "impl A {\n          fn f() {\n      body();\n  }\n}\n"
        );

        let fuzzy = apply(
            content,
            &[("  fn  f() {}  ", "fn f() {\n    body();\n}")],
        )
        .expect("apply");
        assert_eq!(
            fuzzy,
            "impl A {\n        fn f() {\n            body();\n        }\n}\n"
        );
    }

    #[test]
    fn normalised_deletion_removes_whole_lines() {
        let content = "keep\n  drop   me\nkeep\n";
        let result = apply(content, &[("drop me\n", "")]).expect("apply");
        assert_eq!(result, "keep\nkeep\n");
    }

    #[test]
    fn first_normalised_window_wins() {
        let content = "  a b\n\ta   b\n";
        let result = apply(content, &[("a  b", "c")]).expect("apply");
        assert_eq!(result, "  c\n\ta   b\n");
    }

    #[test]
    fn normalised_match_skips_lines_written_by_earlier_edits() {
        let content = "  a  b\n\ta b\n";
        let result = apply(content, &[("a   b", "a b"), ("a   b", "c")]).expect("apply");
        assert_eq!(result, "  a b\n\tc\n");
    }

    #[test]
    fn consumed_spans_shift_and_merge() {
        let mut consumed = ConsumedSpans::default();
        consumed.record(2..3, 4);
        assert_eq!(consumed.0, vec![2..6]);

        consumed.record(0..1, 0);
        assert_eq!(consumed.0, vec![1..5]);

        consumed.record(4..7, 1);
        assert_eq!(consumed.0, vec![1..5]);
        assert!(consumed.overlaps(&(4..6)));
        assert!(!consumed.overlaps(&(5..6)));
    }

    #[test]
    fn unmatched_edit_reports_its_index() {
        let error = apply("alpha\n", &[("alpha", "beta"), ("missing", "x")])
            .expect_err("unmatched");
        match error {
            FsError::UnmatchedEdit { index, snippet, .. } => {
                assert_eq!(index, 1);
                assert_eq!(snippet, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_old_text_is_invalid() {
        let error = apply("alpha\n", &[("", "x")]).expect_err("empty");
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn long_snippets_are_truncated() {
        let long = "x".repeat(200);
        assert_eq!(snippet(&long).chars().count(), SNIPPET_CHARS + 3);
    }
}
