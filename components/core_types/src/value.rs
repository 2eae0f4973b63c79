//! Script value representation
//!
//! This module provides the [`Value`] enum shared by the engine and its
//! native libraries, together with the two kinds of callable function:
//! native functions implemented in Rust and closures over compiled
//! prototypes.

use std::fmt;
use std::rc::Rc;

use bytecode_system::FunctionProto;

use crate::args::CallArgs;
use crate::error::ScriptResult;
use crate::state::State;
use crate::table::Table;

/// Signature of a native function
///
/// Natives receive the engine instance and their arguments and return any
/// number of results.
pub type NativeFn = fn(&mut State, CallArgs<'_>) -> ScriptResult<Vec<Value>>;

/// A function implemented in Rust, optionally carrying bound upvalues
pub struct NativeFunction {
    /// Name used in error messages
    pub name: String,
    /// Implementation
    pub func: NativeFn,
    /// Values bound at creation time
    pub upvalues: Vec<Value>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("upvalues", &self.upvalues.len())
            .finish()
    }
}

/// A compiled prototype bound to an environment
#[derive(Debug)]
pub struct Closure {
    /// Compiled body
    pub proto: Rc<FunctionProto>,
    /// Globals the function resolves free names against
    pub env: Table,
    /// Captured upvalues, initialised to nil
    pub upvalues: Vec<Value>,
}

/// Callable value
#[derive(Debug, Clone)]
pub enum Function {
    /// Rust implementation
    Native(Rc<NativeFunction>),
    /// Compiled script function
    Closure(Rc<Closure>),
}

impl Function {
    /// Identity comparison
    pub fn ptr_eq(&self, other: &Function) -> bool {
        match (self, other) {
            (Function::Native(a), Function::Native(b)) => Rc::ptr_eq(a, b),
            (Function::Closure(a), Function::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Address used for identity hashing and display
    pub fn addr(&self) -> usize {
        match self {
            Function::Native(f) => Rc::as_ptr(f) as usize,
            Function::Closure(c) => Rc::as_ptr(c) as usize,
        }
    }
}

/// Any script value
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let n = Value::Number(3.0);
/// assert_eq!(n.type_name(), "number");
/// assert_eq!(n.to_string(), "3");
/// assert!(!Value::Nil.is_truthy());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Nil,
    /// true or false
    Boolean(bool),
    /// IEEE 754 double
    Number(f64),
    /// Immutable string
    String(Rc<str>),
    /// Reference to a table
    Table(Table),
    /// Reference to a function
    Function(Function),
}

impl Value {
    /// Build a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Wrap a native function with no upvalues
    pub fn native(name: impl Into<String>, func: NativeFn) -> Self {
        Value::native_closure(name, func, Vec::new())
    }

    /// Wrap a native function with bound upvalues
    pub fn native_closure(name: impl Into<String>, func: NativeFn, upvalues: Vec<Value>) -> Self {
        Value::Function(Function::Native(Rc::new(NativeFunction {
            name: name.into(),
            func,
            upvalues,
        })))
    }

    /// Type name as reported by `type()`
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Function(_) => "function",
        }
    }

    /// Everything except nil and false is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// Whether the value is nil
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Try to get the number value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the table
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Try to get the function
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Number value, converting numeric strings
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Raw equality: by value for primitives, by identity for references
    pub fn raw_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Table(t) => write!(f, "table: {:#010x}", t.addr()),
            Value::Function(Function::Native(nf)) => {
                write!(f, "function: builtin: {:#010x}", Rc::as_ptr(nf) as usize)
            }
            Value::Function(func) => write!(f, "function: {:#010x}", func.addr()),
        }
    }
}

/// Format a number the way `tostring` does (`%.14g`)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return if n.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:.13e}", n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..14).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (13 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Parse a numeric string as `tonumber` does without a base
///
/// Accepts surrounding whitespace, decimal notation with an optional
/// exponent, and `0x` hexadecimal integers.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let magnitude = hex
            .chars()
            .fold(0f64, |acc, c| acc * 16.0 + f64::from(c.to_digit(16).unwrap_or(0)));
        return Some(if negative { -magnitude } else { magnitude });
    }

    // Rust accepts "inf" and "nan"; scripts only get plain numerals
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    s.parse::<f64>().ok()
}
