//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use warden_fs::FsError;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to determine the working directory: {0}")]
    WorkingDirectory(io::Error),
    #[error("failed to read input from stdin: {0}")]
    ReadInput(io::Error),
    #[error("edits must be a JSON array of {{\"oldText\", \"newText\"}} objects: {0}")]
    ParseEdits(serde_json::Error),
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
    #[error(transparent)]
    Fs(#[from] FsError),
}

impl AppError {
    /// Renders the error for the error stream.
    ///
    /// Filesystem failures use the JSON error envelope so machine callers can
    /// branch on the error kind; everything else is a plain message.
    pub(crate) fn render(&self) -> String {
        match self {
            Self::Fs(error) => error.to_json().unwrap_or_else(|_| error.to_string()),
            other => other.to_string(),
        }
    }
}
