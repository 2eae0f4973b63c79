//! Read-only OS queries: clocks and date formatting

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use std::fmt::Display;

use core_types::{CallArgs, ScriptError, ScriptResult, State, Table, Value};

/// `os.clock()` - seconds elapsed since the engine instance was created
pub fn os_clock(state: &mut State, _: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    Ok(vec![Value::Number(state.started().elapsed().as_secs_f64())])
}

/// `os.difftime(t2 [, t1])`
pub fn os_difftime(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let t2 = args.check_number(1)?;
    let t1 = args.opt_number(2, 0.0)?;
    Ok(vec![Value::Number(t2 - t1)])
}

/// `os.time([t])` - current Unix time, or the local time described by `t`
pub fn os_time(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    if args.get(1).is_nil() {
        return Ok(vec![Value::Number(Utc::now().timestamp() as f64)]);
    }

    let fields = args.check_table(1)?;
    let year = date_field(&fields, "year", None)?;
    let month = date_field(&fields, "month", None)?;
    let day = date_field(&fields, "day", None)?;
    let hour = date_field(&fields, "hour", Some(12.0))?;
    let min = date_field(&fields, "min", Some(0.0))?;
    let sec = date_field(&fields, "sec", Some(0.0))?;

    let timestamp = local_timestamp(year, month, day, hour, min, sec);
    Ok(vec![timestamp.map(|ts| Value::Number(ts as f64)).unwrap_or_default()])
}

fn date_field(fields: &Table, key: &str, default: Option<f64>) -> ScriptResult<f64> {
    match fields.get_str(key).to_number() {
        Some(n) => Ok(n),
        None => default
            .ok_or_else(|| ScriptError::runtime(format!("field '{}' missing in date table", key))),
    }
}

/// Largest magnitude a date field may have (2^53, exact in an f64)
const MAX_FIELD: f64 = 9_007_199_254_740_992.0;

fn whole(n: f64) -> Option<i64> {
    (n.is_finite() && n.abs() <= MAX_FIELD).then_some(n as i64)
}

/// Local timestamp of a broken-down date, `None` when unrepresentable
///
/// Out-of-range fields roll over into the next larger unit.
fn local_timestamp(year: f64, month: f64, day: f64, hour: f64, min: f64, sec: f64) -> Option<i64> {
    let months = whole(year)?
        .checked_mul(12)?
        .checked_add(whole(month)?.checked_sub(1)?)?;
    let offset = whole(day)?
        .checked_sub(1)?
        .checked_mul(86_400)?
        .checked_add(whole(hour)?.checked_mul(3_600)?)?
        .checked_add(whole(min)?.checked_mul(60)?)?
        .checked_add(whole(sec)?)?;

    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let midnight = NaiveDate::from_ymd_opt(year, months.rem_euclid(12) as u32 + 1, 1)?
        .and_hms_opt(0, 0, 0)?;
    let naive = midnight.checked_add_signed(TimeDelta::try_seconds(offset)?)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// `os.date([format [, time]])`
///
/// A leading `!` formats in UTC. `*t` returns the broken-down time as a
/// table; anything else is a strftime pattern.
pub fn os_date(_: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let format = args.opt_string(1, "%c")?;
    let timestamp = if args.get(2).is_nil() {
        Utc::now().timestamp()
    } else {
        args.check_integer(2)?
    };
    let instant = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| args.bad_argument(2, "time out of range"))?;

    let (utc, pattern) = match format.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, &*format),
    };

    if pattern.starts_with("*t") {
        let table = if utc {
            date_table(&instant)
        } else {
            date_table(&instant.with_timezone(&Local))
        };
        return Ok(vec![Value::Table(table)]);
    }

    let formatted = if utc {
        strftime(&instant, pattern)
    } else {
        strftime(&instant.with_timezone(&Local), pattern)
    };
    match formatted {
        Some(text) => Ok(vec![Value::string(text)]),
        None => Err(args.bad_argument(1, format!("invalid conversion specifier '{}'", pattern))),
    }
}

fn strftime<Tz: TimeZone>(instant: &DateTime<Tz>, pattern: &str) -> Option<String>
where
    Tz::Offset: Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(instant.format_with_items(items.iter()).to_string())
}

fn date_table<Tz: TimeZone>(instant: &DateTime<Tz>) -> Table {
    let table = Table::new();
    table.set_str("year", Value::Number(f64::from(instant.year())));
    table.set_str("month", Value::Number(f64::from(instant.month())));
    table.set_str("day", Value::Number(f64::from(instant.day())));
    table.set_str("hour", Value::Number(f64::from(instant.hour())));
    table.set_str("min", Value::Number(f64::from(instant.minute())));
    table.set_str("sec", Value::Number(f64::from(instant.second())));
    table.set_str(
        "wday",
        Value::Number(f64::from(instant.weekday().number_from_sunday())),
    );
    table.set_str("yday", Value::Number(f64::from(instant.ordinal())));
    table.set_str("isdst", Value::Boolean(false));
    table
}
