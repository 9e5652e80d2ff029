//! Error type for the scan tooling.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tuner_protocol::{AccessError, ProtocolError};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON-lines capture contains a line that is not a scan event.
    #[error("{}:{line}: {message}", path.display())]
    Capture {
        path: PathBuf,
        line: usize,
        message: String,
    },
}
