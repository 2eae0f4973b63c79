//! Core script value types and the engine instance surface.
//!
//! This crate provides the value model the sandbox libraries and the
//! function loader work with, and the handful of engine primitives they
//! consume: module registration, closure construction and error raising.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of script values
//! - [`Table`] - Shared, insertion-ordered associative array
//! - [`State`] - One engine instance: globals, module registry, executor hook
//! - [`CallArgs`] - Argument access for native functions
//! - [`ScriptError`] - Errors raised by script-facing code
//!
//! # Examples
//!
//! ```
//! use core_types::{CallArgs, ScriptResult, State, Value};
//!
//! fn double(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
//!     Ok(vec![Value::Number(args.check_number(1)? * 2.0)])
//! }
//!
//! let mut state = State::new();
//! let f = Value::native("double", double);
//! let out = state.call(&f, vec![Value::Number(21.0)]).unwrap();
//! assert_eq!(out[0].as_number(), Some(42.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod args;
mod error;
mod state;
mod table;
mod value;

pub use args::CallArgs;
pub use error::{ScriptError, ScriptResult};
pub use state::{Executor, State, GLOBALS_NAME};
pub use table::Table;
pub use value::{format_number, parse_number, Closure, Function, NativeFn, NativeFunction, Value};
