//! Sandboxed standard library
//!
//! This crate provides the library functions a restricted script may call
//! and the builder that assembles them into a secure environment:
//! - Base functions: `error`, `tonumber`, `tostring`, `type`, `next`,
//!   `pairs`, `ipairs`, `unpack`
//! - Module loading: `module`, `require`
//! - OS queries: `os.clock`, `os.difftime`, `os.date`, `os.time`
//!
//! # Example
//!
//! ```
//! use builtins::SecureEnvironment;
//! use core_types::{State, Value};
//!
//! let mut state = State::new();
//! SecureEnvironment::build().install(&mut state);
//!
//! let tostring = state.get_global("tostring");
//! let out = state.call(&tostring, vec![Value::Number(3.0)]).unwrap();
//! assert_eq!(out[0].as_str(), Some("3"));
//!
//! // Anything outside the allowlist is simply absent
//! assert!(state.get_global("dofile").is_nil());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod base;
pub mod os;
pub mod package;
pub mod sandbox;

pub use sandbox::{
    open_secure_base, open_secure_os, SecureEnvironment, OS_MODULE_NAME, SECURE_BASE_FUNCS,
    SECURE_OS_FUNCS,
};
