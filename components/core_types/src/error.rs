//! Script error types
//!
//! [`ScriptError`] is what native functions return to abort the current
//! call. It plays the role of the engine's raise-fatal-error primitive.

use thiserror::Error;

use crate::Value;

/// An error raised while running script-facing code
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    /// Value passed to `error()` by a script
    #[error("{0}")]
    Raised(Value),

    /// A native function received an argument it cannot use
    #[error("bad argument #{position} to '{function}' ({message})")]
    BadArgument {
        /// 1-based argument position
        position: usize,
        /// Name of the native function
        function: String,
        /// What was wrong with the argument
        message: String,
    },

    /// Engine-level failure
    #[error("{0}")]
    Runtime(String),
}

impl ScriptError {
    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        ScriptError::Runtime(message.into())
    }

    /// Create a bad-argument error
    pub fn bad_argument(
        position: usize,
        function: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ScriptError::BadArgument {
            position,
            function: function.into(),
            message: message.into(),
        }
    }

    /// The error as a script value, as `error()` handlers would see it
    pub fn to_value(&self) -> Value {
        match self {
            ScriptError::Raised(value) => value.clone(),
            other => Value::string(other.to_string()),
        }
    }
}

/// Result type for script-facing operations
pub type ScriptResult<T> = Result<T, ScriptError>;
