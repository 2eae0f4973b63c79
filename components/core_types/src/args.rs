//! Argument access for native functions

use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::table::Table;
use crate::value::Value;

/// Arguments and bound upvalues of one native call
///
/// Positions are 1-based, matching how scripts and error messages count.
#[derive(Debug)]
pub struct CallArgs<'a> {
    function: &'a str,
    args: Vec<Value>,
    upvalues: &'a [Value],
}

impl<'a> CallArgs<'a> {
    /// Bundle the arguments for a call to `function`
    pub fn new(function: &'a str, args: Vec<Value>, upvalues: &'a [Value]) -> Self {
        Self {
            function,
            args,
            upvalues,
        }
    }

    /// Argument at `position`, nil when absent
    pub fn get(&self, position: usize) -> Value {
        position
            .checked_sub(1)
            .and_then(|idx| self.args.get(idx))
            .cloned()
            .unwrap_or_default()
    }

    /// Bound upvalue at `index` (0-based), nil when absent
    pub fn upvalue(&self, index: usize) -> Value {
        self.upvalues.get(index).cloned().unwrap_or_default()
    }

    /// Error for a bad argument at `position`
    pub fn bad_argument(&self, position: usize, message: impl Into<String>) -> ScriptError {
        ScriptError::bad_argument(position, self.function, message)
    }

    fn type_error(&self, position: usize, expected: &str) -> ScriptError {
        let got = if position > self.args.len() {
            "no value"
        } else {
            self.get(position).type_name()
        };
        self.bad_argument(position, format!("{} expected, got {}", expected, got))
    }

    /// Any value, but it must be present
    pub fn check_any(&self, position: usize) -> ScriptResult<Value> {
        if position == 0 || position > self.args.len() {
            return Err(self.bad_argument(position, "value expected"));
        }
        Ok(self.get(position))
    }

    /// Table argument
    pub fn check_table(&self, position: usize) -> ScriptResult<Table> {
        match self.get(position) {
            Value::Table(t) => Ok(t),
            _ => Err(self.type_error(position, "table")),
        }
    }

    /// Number argument, converting numeric strings
    pub fn check_number(&self, position: usize) -> ScriptResult<f64> {
        self.get(position)
            .to_number()
            .ok_or_else(|| self.type_error(position, "number"))
    }

    /// Integer argument (numbers are truncated toward zero)
    pub fn check_integer(&self, position: usize) -> ScriptResult<i64> {
        self.check_number(position).map(|n| n as i64)
    }

    /// String argument, converting numbers
    pub fn check_string(&self, position: usize) -> ScriptResult<Rc<str>> {
        match self.get(position) {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(Rc::from(crate::value::format_number(n).as_str())),
            _ => Err(self.type_error(position, "string")),
        }
    }

    /// Optional number argument
    pub fn opt_number(&self, position: usize, default: f64) -> ScriptResult<f64> {
        if self.get(position).is_nil() {
            Ok(default)
        } else {
            self.check_number(position)
        }
    }

    /// Optional integer argument
    pub fn opt_integer(&self, position: usize, default: i64) -> ScriptResult<i64> {
        if self.get(position).is_nil() {
            Ok(default)
        } else {
            self.check_integer(position)
        }
    }

    /// Optional string argument
    pub fn opt_string(&self, position: usize, default: &str) -> ScriptResult<Rc<str>> {
        if self.get(position).is_nil() {
            Ok(Rc::from(default))
        } else {
            self.check_string(position)
        }
    }
}
