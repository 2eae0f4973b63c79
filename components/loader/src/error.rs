//! Loader error types

use bytecode_system::DecodeError;
use thiserror::Error;

/// Failure while loading a chunk
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the stream or file failed
    #[error("failed to read chunk: {0}")]
    Io(#[from] std::io::Error),

    /// The precompiled payload was rejected
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The payload after the signature exceeds the configured limit
    #[error("precompiled artifact exceeds {limit} bytes")]
    TooLarge {
        /// Configured maximum payload size
        limit: u64,
    },
}

/// Result type for loader operations
pub type LoadResult<T> = Result<T, LoadError>;
