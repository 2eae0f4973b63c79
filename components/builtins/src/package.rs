//! Controlled module loading: `module` and `require`
//!
//! Both work only against the instance's module registry and the openers
//! the host registered with [`State::set_preload`]. Nothing is read from
//! the filesystem.

use core_types::{CallArgs, ScriptError, ScriptResult, State, Table, Value};
use tracing::debug;

/// `module(name)` - create or reuse a module table and publish it
///
/// The table is stored in the module registry and as global `name`, and
/// gets the conventional `_NAME`, `_M` and `_PACKAGE` fields.
pub fn lo_module(state: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let name = args.check_string(1)?;
    let loaded = state.loaded();

    let module = match loaded.get_str(&name) {
        Value::Table(existing) => existing,
        Value::Nil => {
            let global = state.get_global(&name);
            match global {
                Value::Table(t) => t,
                Value::Nil => Table::new(),
                _ => {
                    return Err(ScriptError::runtime(format!(
                        "name conflict for module '{}'",
                        name
                    )))
                }
            }
        }
        _ => {
            return Err(ScriptError::runtime(format!(
                "name conflict for module '{}'",
                name
            )))
        }
    };

    if module.get_str("_NAME").is_nil() {
        module.set_str("_M", Value::Table(module.clone()));
        module.set_str("_NAME", Value::string(&*name));
        let package = match name.rfind('.') {
            Some(idx) => &name[..=idx],
            None => "",
        };
        module.set_str("_PACKAGE", Value::string(package));
    }

    loaded.set_str(&name, Value::Table(module.clone()));
    state.set_global(&name, Value::Table(module.clone()));
    debug!(module = %name, "module declared");
    Ok(vec![Value::Table(module)])
}

/// `require(name)` - return a registered module, opening it on first use
pub fn lo_require(state: &mut State, args: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let name = args.check_string(1)?;
    let loaded = state.loaded();

    let existing = loaded.get_str(&name);
    if existing.is_truthy() {
        return Ok(vec![existing]);
    }

    let opener = state.preload().get_str(&name);
    if opener.is_nil() {
        return Err(ScriptError::runtime(format!("module '{}' not found", name)));
    }

    debug!(module = %name, "opening module");
    let results = state.call(&opener, vec![Value::string(&*name)])?;
    let opened = results.into_iter().next().unwrap_or_default();

    // An opener may register itself in `loaded`; keep what it stored
    let module = match loaded.get_str(&name) {
        stored if stored.is_truthy() => stored,
        _ if opened.is_truthy() => opened,
        _ => Value::Boolean(true),
    };
    loaded.set_str(&name, module.clone());
    Ok(vec![module])
}
