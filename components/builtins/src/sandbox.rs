//! Restricted script environments
//!
//! A secure environment is a fresh globals table holding only the base
//! allowlist, plus an `os` module holding only read-only time queries.
//! Nothing outside [`SECURE_BASE_FUNCS`], the two iterator constructors
//! and [`SECURE_OS_FUNCS`] is reachable from a script bound to it.

use core_types::{CallArgs, NativeFn, ScriptResult, State, Table, Value, GLOBALS_NAME};
use tracing::debug;

use crate::base::{
    base_error, base_ipairs, base_next, base_pairs, base_tonumber, base_tostring, base_type,
    base_unpack, ipairs_aux, pairs_aux,
};
use crate::os::{os_clock, os_date, os_difftime, os_time};
use crate::package::{lo_module, lo_require};

/// Name the OS module is registered under
pub const OS_MODULE_NAME: &str = "os";

/// Base functions registered directly into the globals table
///
/// `pairs` and `ipairs` are not listed here: each needs its step function
/// bound as an upvalue, see [`SecureEnvironment::build`].
pub static SECURE_BASE_FUNCS: &[(&str, NativeFn)] = &[
    ("error", base_error),
    ("tonumber", base_tonumber),
    ("tostring", base_tostring),
    ("type", base_type),
    ("next", base_next),
    ("unpack", base_unpack),
    ("module", lo_module),
    ("require", lo_require),
];

/// Functions exposed by the restricted `os` module
pub static SECURE_OS_FUNCS: &[(&str, NativeFn)] = &[
    ("clock", os_clock),
    ("difftime", os_difftime),
    ("date", os_date),
    ("time", os_time),
];

/// A restricted globals table and its companion `os` module
///
/// Building is pure; nothing touches an engine instance until
/// [`install`](SecureEnvironment::install) is called.
///
/// # Example
///
/// ```
/// use builtins::SecureEnvironment;
/// use core_types::State;
///
/// let env = SecureEnvironment::build();
/// assert!(env.globals.get_str("os").is_nil());
///
/// let mut state = State::new();
/// env.install(&mut state);
/// assert!(state.globals().ptr_eq(&env.globals));
/// ```
#[derive(Debug, Clone)]
pub struct SecureEnvironment {
    /// Globals table holding the base allowlist
    pub globals: Table,
    /// The `os` module, reachable through `require("os")`
    pub os: Table,
}

impl SecureEnvironment {
    /// Build a fresh environment
    pub fn build() -> Self {
        let globals = Table::from_functions(SECURE_BASE_FUNCS);
        bind_iterators(&globals);
        let os = Table::from_functions(SECURE_OS_FUNCS);
        debug!(
            globals = globals.len(),
            os = os.len(),
            "secure environment built"
        );
        Self { globals, os }
    }

    /// Make this environment the globals binding of `state`
    ///
    /// Registers the globals under `_G` and the OS module under `os` in the
    /// instance's module registry. Replaces whatever binding was there.
    pub fn install(&self, state: &mut State) {
        state.set_globals(self.globals.clone());
        let loaded = state.loaded();
        loaded.set_str(GLOBALS_NAME, Value::Table(self.globals.clone()));
        loaded.set_str(OS_MODULE_NAME, Value::Table(self.os.clone()));
        debug!("secure environment installed");
    }
}

fn bind_iterators(globals: &Table) {
    let pairs_step = Value::native("next", pairs_aux);
    let ipairs_step = Value::native("ipairs_aux", ipairs_aux);
    globals.set_str(
        "pairs",
        Value::native_closure("pairs", base_pairs, vec![pairs_step]),
    );
    globals.set_str(
        "ipairs",
        Value::native_closure("ipairs", base_ipairs, vec![ipairs_step]),
    );
}

/// Module initializer for the base sandbox
///
/// Replaces the instance's globals with a fresh table populated through
/// the module registration primitive. Returns the globals table.
pub fn open_secure_base(state: &mut State, _: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    state.set_globals(Table::new());
    let globals = state.register_module(GLOBALS_NAME, SECURE_BASE_FUNCS);
    bind_iterators(&globals);
    Ok(vec![Value::Table(globals)])
}

/// Module initializer for the OS sandbox; returns the `os` table
pub fn open_secure_os(state: &mut State, _: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let os = state.register_module(OS_MODULE_NAME, SECURE_OS_FUNCS);
    Ok(vec![Value::Table(os)])
}
