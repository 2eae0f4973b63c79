//! Contract tests for module and require inside a secure environment

use builtins::SecureEnvironment;
use core_types::{CallArgs, ScriptResult, State, Table, Value};

fn greeting_module(_: &mut State, _: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    let t = Table::new();
    t.set_str("hello", Value::string("world"));
    Ok(vec![Value::Table(t)])
}

#[test]
fn test_require_uses_host_preload() {
    let mut state = State::new();
    SecureEnvironment::build().install(&mut state);
    state.set_preload("greeting", greeting_module);

    let require = state.get_global("require");
    let out = state.call(&require, vec![Value::string("greeting")]).unwrap();
    assert_eq!(out[0].as_table().unwrap().get_str("hello").as_str(), Some("world"));
    assert!(!state.loaded().get_str("greeting").is_nil());
}

#[test]
fn test_module_publishes_into_sandbox_globals() {
    let mut state = State::new();
    let env = SecureEnvironment::build();
    env.install(&mut state);

    let module = state.get_global("module");
    state.call(&module, vec![Value::string("shapes")]).unwrap();
    assert!(!env.globals.get_str("shapes").is_nil());

    let require = state.get_global("require");
    let out = state.call(&require, vec![Value::string("shapes")]).unwrap();
    assert_eq!(
        out[0].as_table().unwrap().get_str("_NAME").as_str(),
        Some("shapes")
    );
}
