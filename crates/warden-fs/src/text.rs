//! Text decoding and line-ending handling.

use std::path::Path;

use similar::{Algorithm, DiffTag, capture_diff_slices};

use crate::error::FsError;

/// Line terminator convention of a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineEnding {
    Lf,
    CrLf,
}

/// Decodes file bytes as text.
///
/// Content that is not valid UTF-8 or that contains NUL bytes is treated as
/// binary.
pub(crate) fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, FsError> {
    if bytes.contains(&0) {
        return Err(FsError::NotText {
            path: path.to_path_buf(),
        });
    }
    String::from_utf8(bytes).map_err(|_| FsError::NotText {
        path: path.to_path_buf(),
    })
}

/// Picks `\r\n` when it is at least as common as bare `\n`.
pub(crate) fn dominant_line_ending(content: &str) -> LineEnding {
    let mut crlf = 0;
    let mut lf = 0;
    let bytes = content.as_bytes();
    for (idx, byte) in bytes.iter().enumerate() {
        if *byte == b'\n' {
            if idx > 0 && bytes[idx - 1] == b'\r' {
                crlf += 1;
            } else {
                lf += 1;
            }
        }
    }

    if crlf > 0 && crlf >= lf {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    }
}

/// Rewrites every `\r\n` as `\n`.
pub(crate) fn to_lf(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Converts an LF-only buffer to `line_ending`.
pub(crate) fn with_line_ending(lf_content: &str, line_ending: LineEnding) -> String {
    match line_ending {
        LineEnding::Lf => lf_content.to_owned(),
        LineEnding::CrLf => lf_content.replace('\n', "\r\n"),
    }
}

/// Converts an edited LF-only buffer back to the terminators of `original`.
///
/// Lines carried over unchanged from `original` keep the exact terminator
/// they had there. Only inserted or rewritten lines take `ending`.
pub(crate) fn restore_line_endings(original: &str, updated: &str, ending: LineEnding) -> String {
    let original_lines = split_lines_inclusive(original);
    let normalised: Vec<String> = original_lines.iter().map(|line| to_lf(line)).collect();
    let before: Vec<&str> = normalised.iter().map(String::as_str).collect();
    let after = split_lines_inclusive(updated);

    let mut output = String::with_capacity(original.len().max(updated.len()));
    for op in capture_diff_slices(Algorithm::Myers, &before, &after) {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => output.extend(original_lines[old].iter().copied()),
            DiffTag::Delete => {}
            DiffTag::Insert | DiffTag::Replace => {
                for line in &after[new] {
                    output.push_str(&with_line_ending(line, ending));
                }
            }
        }
    }
    output
}

/// Splits text into lines that keep their terminators.
pub(crate) fn split_lines_inclusive(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}
