//! Codec error types

use thiserror::Error;

/// A precompiled payload that cannot be turned back into a prototype tree
///
/// Decoding is all-or-nothing: any of these aborts the whole tree.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The MessagePack payload is malformed or truncated
    #[error("malformed container payload: {0}")]
    Unmarshal(#[from] rmp_serde::decode::Error),

    /// Bytes remain after the single container value
    #[error("unexpected trailing data: consumed {consumed} of {total} bytes")]
    TrailingBytes {
        /// Bytes consumed by the container value
        consumed: usize,
        /// Total payload length
        total: usize,
    },

    /// A constant of a kind other than String or Number
    #[error("unsupported constant kind at {path}, constant #{index}")]
    UnsupportedConstant {
        /// Child index path of the offending prototype
        path: String,
        /// Position in the constant pool
        index: usize,
    },

    /// Code and source position tables disagree in length
    #[error("{path}: {code} instructions but {positions} source positions")]
    LengthMismatch {
        /// Child index path of the offending prototype
        path: String,
        /// Instruction count
        code: usize,
        /// Source position count
        positions: usize,
    },

    /// The decoder thread could not be started
    #[error("could not start container decoder: {0}")]
    Stack(#[source] std::io::Error),

    /// Child prototypes nested deeper than the decoder accepts
    #[error("function prototypes nested deeper than {limit} levels")]
    NestingTooDeep {
        /// Maximum accepted depth
        limit: usize,
    },
}

/// Failure while producing a precompiled payload
#[derive(Debug, Error)]
pub enum EncodeError {
    /// MessagePack serialization failed
    #[error("failed to marshal container: {0}")]
    Marshal(#[from] rmp_serde::encode::Error),

    /// The encoder thread could not be started
    #[error("could not start container encoder: {0}")]
    Stack(#[source] std::io::Error),

    /// Writing the artifact failed
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}
