//! Text and media reads.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{ErrorKind, FsError};
use crate::resolver::ResolvedPath;
use crate::text::{decode, split_lines_inclusive};

/// Portion of a text file to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadWindow {
    /// The whole file.
    #[default]
    All,
    /// The first `n` lines.
    Head(usize),
    /// The last `n` lines.
    Tail(usize),
}

impl ReadWindow {
    /// Builds a window from optional head and tail counts.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::InvalidArgument`] when both are given.
    pub fn from_options(head: Option<usize>, tail: Option<usize>) -> Result<Self, FsError> {
        match (head, tail) {
            (Some(_), Some(_)) => Err(FsError::invalid_argument(
                "head and tail cannot be combined",
            )),
            (Some(lines), None) => Ok(Self::Head(lines)),
            (None, Some(lines)) => Ok(Self::Tail(lines)),
            (None, None) => Ok(Self::All),
        }
    }
}

/// Reads a text file, optionally limited to its first or last lines.
///
/// Returned lines keep their original terminators.
pub fn read_text(path: &ResolvedPath, window: ReadWindow) -> Result<String, FsError> {
    let path = path.as_path();
    let bytes = fs::read(path).map_err(|err| FsError::read(path, &err))?;
    let content = decode(path, bytes)?;

    Ok(match window {
        ReadWindow::All => content,
        ReadWindow::Head(count) => split_lines_inclusive(&content)
            .into_iter()
            .take(count)
            .collect(),
        ReadWindow::Tail(count) => {
            let lines = split_lines_inclusive(&content);
            let skip = lines.len().saturating_sub(count);
            lines[skip..].concat()
        }
    })
}

/// Result of reading one file in a batch.
#[derive(Debug)]
pub struct ReadOutcome {
    /// Path as supplied by the caller.
    pub path: String,
    /// File content, or why this one file could not be read.
    pub result: Result<String, FsError>,
}

impl Serialize for ReadOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ReadOutcome", 3)?;
        state.serialize_field("path", &self.path)?;
        match &self.result {
            Ok(content) => {
                state.serialize_field("status", "ok")?;
                state.serialize_field("content", content)?;
            }
            Err(error) => {
                state.serialize_field("status", "error")?;
                state.serialize_field(
                    "error",
                    &ReadFailure {
                        kind: error.kind(),
                        message: error.to_string(),
                    },
                )?;
            }
        }
        state.end()
    }
}

#[derive(Serialize)]
struct ReadFailure {
    #[serde(rename = "type")]
    kind: ErrorKind,
    message: String,
}

/// Broad category of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// `image/*` types.
    Image,
    /// `audio/*` types.
    Audio,
    /// Anything else, served as `application/octet-stream`.
    Blob,
}

/// Base64-encoded file content with its detected MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaContent {
    /// MIME type guessed from the file extension.
    pub mime_type: &'static str,
    /// Category derived from `mime_type`.
    pub kind: MediaKind,
    /// Standard base64 with padding.
    pub data: String,
}

/// Reads any file as base64, typing it by extension.
pub fn read_media(path: &ResolvedPath) -> Result<MediaContent, FsError> {
    let path = path.as_path();
    let bytes = fs::read(path).map_err(|err| FsError::read(path, &err))?;
    let (mime_type, kind) = media_type(path);
    Ok(MediaContent {
        mime_type,
        kind,
        data: STANDARD.encode(bytes),
    })
}

fn media_type(path: &Path) -> (&'static str, MediaKind) {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => ("image/png", MediaKind::Image),
        Some("jpg" | "jpeg") => ("image/jpeg", MediaKind::Image),
        Some("gif") => ("image/gif", MediaKind::Image),
        Some("webp") => ("image/webp", MediaKind::Image),
        Some("bmp") => ("image/bmp", MediaKind::Image),
        Some("svg") => ("image/svg+xml", MediaKind::Image),
        Some("mp3") => ("audio/mpeg", MediaKind::Audio),
        Some("wav") => ("audio/wav", MediaKind::Audio),
        Some("ogg") => ("audio/ogg", MediaKind::Audio),
        Some("flac") => ("audio/flac", MediaKind::Audio),
        _ => ("application/octet-stream", MediaKind::Blob),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("photo.PNG", "image/png", MediaKind::Image)]
    #[case("photo.jpeg", "image/jpeg", MediaKind::Image)]
    #[case("icon.svg", "image/svg+xml", MediaKind::Image)]
    #[case("song.flac", "audio/flac", MediaKind::Audio)]
    #[case("archive.tar.gz", "application/octet-stream", MediaKind::Blob)]
    #[case("Makefile", "application/octet-stream", MediaKind::Blob)]
    fn types_media_by_extension(
        #[case] name: &str,
        #[case] mime: &str,
        #[case] kind: MediaKind,
    ) {
        assert_eq!(media_type(Path::new(name)), (mime, kind));
    }

    #[test]
    fn head_and_tail_are_exclusive() {
        let error = ReadWindow::from_options(Some(1), Some(1)).expect_err("both");
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn failed_outcomes_serialise_their_kind() {
        let outcome = ReadOutcome {
            path: String::from("missing.txt"),
            result: Err(FsError::NotFound {
                path: "/srv/missing.txt".into(),
            }),
        };
        let value = serde_json::to_value(&outcome).expect("serialise");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["type"], "NotFound");
        assert_eq!(value["path"], "missing.txt");
    }
}
