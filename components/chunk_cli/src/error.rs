//! Error types for the CLI

use std::path::PathBuf;

use bytecode_system::{DecodeError, EncodeError};
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input or output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The artifact could not be decoded
    #[error("Invalid artifact: {0}")]
    Decode(#[from] DecodeError),

    /// The artifact could not be produced
    #[error("Could not write artifact: {0}")]
    Encode(#[from] EncodeError),

    /// The input has no artifact signature
    #[error("'{}' is source text, not a precompiled artifact", .0.display())]
    NotPrecompiled(PathBuf),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
