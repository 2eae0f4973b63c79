//! Base library functions
//!
//! Error signaling, conversions, type inspection and table iteration.
//! Each function has the [`NativeFn`](core_types::NativeFn) signature.

use core_types::{parse_number, CallArgs, ScriptError, ScriptResult, State, Value};

/// `error(message [, level])`
///
/// Raises `message` as the error value. The level argument is accepted
/// for compatibility; no position information is prepended.
pub fn base_error(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    Err(ScriptError::Raised(args.get(1)))
}

/// `tonumber(v [, base])`
pub fn base_tonumber(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let value = args.check_any(1)?;
    if args.get(2).is_nil() {
        let n = value.to_number().map(Value::Number).unwrap_or_default();
        return Ok(vec![n]);
    }

    let base = args.check_integer(2)?;
    if !(2..=36).contains(&base) {
        return Err(args.bad_argument(2, "base out of range"));
    }
    let text = args.check_string(1)?;
    Ok(vec![parse_in_base(&text, base as u32)
        .map(Value::Number)
        .unwrap_or_default()])
}

fn parse_in_base(text: &str, base: u32) -> Option<f64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() {
        return None;
    }
    let mut acc = 0f64;
    for c in digits.chars() {
        let digit = c.to_digit(base)?;
        acc = acc * f64::from(base) + f64::from(digit);
    }
    Some(if negative { -acc } else { acc })
}

/// `tostring(v)`
pub fn base_tostring(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let value = args.check_any(1)?;
    Ok(vec![Value::string(value.to_string())])
}

/// `type(v)`
pub fn base_type(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let value = args.check_any(1)?;
    Ok(vec![Value::string(value.type_name())])
}

/// `next(t [, k])`
pub fn base_next(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let table = args.check_table(1)?;
    match table.next(&args.get(2))? {
        Some((key, value)) => Ok(vec![key, value]),
        None => Ok(vec![Value::Nil]),
    }
}

/// `pairs(t)` - returns the bound step function, `t` and nil
pub fn base_pairs(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let table = args.check_table(1)?;
    Ok(vec![args.upvalue(0), Value::Table(table), Value::Nil])
}

/// Step function bound into `pairs`
pub fn pairs_aux(state: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    base_next(state, args)
}

/// `ipairs(t)` - returns the bound step function, `t` and 0
pub fn base_ipairs(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let table = args.check_table(1)?;
    Ok(vec![args.upvalue(0), Value::Table(table), Value::Number(0.0)])
}

/// Step function bound into `ipairs`
pub fn ipairs_aux(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let table = args.check_table(1)?;
    let index = match args.check_integer(2)?.checked_add(1) {
        Some(index) => index,
        None => return Ok(vec![Value::Nil]),
    };
    let value = table.get(&Value::Number(index as f64));
    if value.is_nil() {
        Ok(vec![Value::Nil])
    } else {
        Ok(vec![Value::Number(index as f64), value])
    }
}

/// Most values a single `unpack` call may return
const MAX_UNPACK: i64 = 1_000_000;

/// `unpack(t [, i [, j]])`
pub fn base_unpack(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let table = args.check_table(1)?;
    let first = args.opt_integer(2, 1)?;
    let last = if args.get(3).is_nil() {
        table.border() as i64
    } else {
        args.check_integer(3)?
    };
    if first > last {
        return Ok(Vec::new());
    }
    // Guard against absurd ranges before allocating
    let count = last.checked_sub(first).and_then(|span| span.checked_add(1));
    if !matches!(count, Some(n) if n <= MAX_UNPACK) {
        return Err(ScriptError::runtime("too many results to unpack"));
    }
    Ok((first..=last)
        .map(|i| table.get(&Value::Number(i as f64)))
        .collect())
}
