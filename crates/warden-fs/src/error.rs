//! Domain errors raised by sandboxed filesystem operations.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Stable classification of an [`FsError`], suitable for machine consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The path resolved outside every allowed directory.
    OutsideAllowedRoots,
    /// The path does not exist.
    NotFound,
    /// The path exists but could not be read.
    NotReadable,
    /// The file is not decodable as text.
    NotText,
    /// Writing to the filesystem failed.
    WriteFailed,
    /// An edit's match text was not found.
    UnmatchedEdit,
    /// The destination of a create or move already exists.
    AlreadyExists,
    /// The caller supplied malformed arguments.
    InvalidArgument,
    /// A configured allowed directory is unusable.
    InvalidRoot,
    /// No allowed directories were configured.
    NoAllowedRoots,
}

impl ErrorKind {
    /// Returns the stable identifier for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutsideAllowedRoots => "OutsideAllowedRoots",
            Self::NotFound => "NotFound",
            Self::NotReadable => "NotReadable",
            Self::NotText => "NotText",
            Self::WriteFailed => "WriteFailed",
            Self::UnmatchedEdit => "UnmatchedEdit",
            Self::AlreadyExists => "AlreadyExists",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidRoot => "InvalidRoot",
            Self::NoAllowedRoots => "NoAllowedRoots",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while resolving paths or performing filesystem operations.
///
/// Underlying I/O failures are folded into the variant that describes what
/// the caller was attempting, with the operating system message preserved.
#[derive(Debug, Error)]
pub enum FsError {
    /// The path resolved outside every allowed directory.
    #[error("access denied: {path} is outside the allowed directories")]
    OutsideAllowedRoots {
        /// Path as supplied by the caller.
        path: String,
    },

    /// The path does not exist.
    #[error("{path} does not exist")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The path exists but could not be read or traversed.
    #[error("failed to read {path}: {message}")]
    NotReadable {
        /// Path that failed.
        path: PathBuf,
        /// Operating system message.
        message: String,
    },

    /// The file content is binary or not valid UTF-8.
    #[error("{path} is not a text file")]
    NotText {
        /// Offending file.
        path: PathBuf,
    },

    /// Writing, renaming, or creating failed.
    #[error("failed to write {path}: {message}")]
    WriteFailed {
        /// Path that failed.
        path: PathBuf,
        /// Operating system message.
        message: String,
    },

    /// An edit's match text could not be located in the file.
    #[error("edit {index} did not match any text in {path}: {snippet:?}")]
    UnmatchedEdit {
        /// File being edited.
        path: PathBuf,
        /// Zero-based position of the failing edit in the batch.
        index: usize,
        /// Leading portion of the unmatched text.
        snippet: String,
    },

    /// The destination already exists.
    #[error("{path} already exists")]
    AlreadyExists {
        /// Existing destination.
        path: PathBuf,
    },

    /// The request was malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// An allowed directory could not be established.
    #[error("allowed directory {path} is unusable: {message}")]
    InvalidRoot {
        /// Directory as configured.
        path: PathBuf,
        /// Reason the directory was rejected.
        message: String,
    },

    /// The allow-list was empty.
    #[error("at least one allowed directory is required")]
    NoAllowedRoots,
}

impl FsError {
    /// Classifies a read-side I/O failure.
    pub(crate) fn read(path: &Path, error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::InvalidData => Self::NotText {
                path: path.to_path_buf(),
            },
            _ => Self::NotReadable {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }

    /// Classifies a write-side I/O failure.
    pub(crate) fn write(path: &Path, error: &io::Error) -> Self {
        Self::WriteFailed {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::OutsideAllowedRoots { .. } => ErrorKind::OutsideAllowedRoots,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotReadable { .. } => ErrorKind::NotReadable,
            Self::NotText { .. } => ErrorKind::NotText,
            Self::WriteFailed { .. } => ErrorKind::WriteFailed,
            Self::UnmatchedEdit { .. } => ErrorKind::UnmatchedEdit,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InvalidRoot { .. } => ErrorKind::InvalidRoot,
            Self::NoAllowedRoots => ErrorKind::NoAllowedRoots,
        }
    }

    /// Renders the error as the JSON envelope written to error streams.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let envelope = ErrorEnvelope {
            status: "error",
            kind: self.kind(),
            details: ErrorDetails {
                message: self.to_string(),
                path: self.path(),
                edit_index: match self {
                    Self::UnmatchedEdit { index, .. } => Some(*index),
                    _ => None,
                },
            },
        };
        serde_json::to_string(&envelope)
    }

    fn path(&self) -> Option<String> {
        match self {
            Self::OutsideAllowedRoots { path } => Some(path.clone()),
            Self::NotFound { path }
            | Self::NotReadable { path, .. }
            | Self::NotText { path }
            | Self::WriteFailed { path, .. }
            | Self::UnmatchedEdit { path, .. }
            | Self::AlreadyExists { path }
            | Self::InvalidRoot { path, .. } => Some(path.display().to_string()),
            Self::InvalidArgument { .. } | Self::NoAllowedRoots => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    status: &'static str,
    #[serde(rename = "type")]
    kind: ErrorKind,
    details: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edit_index: Option<usize>,
}
