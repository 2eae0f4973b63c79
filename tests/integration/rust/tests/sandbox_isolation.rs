//! Sandbox Isolation Integration Tests
//!
//! Tests that independently built environments share nothing and that a
//! secure environment can be assembled through the module initializers.

use builtins::{open_secure_base, open_secure_os, SecureEnvironment};
use core_types::{CallArgs, State, Value, GLOBALS_NAME};

/// Test: two instances get independent environments
#[test]
fn test_instances_do_not_share_globals() {
    let mut first = State::new();
    let mut second = State::new();
    SecureEnvironment::build().install(&mut first);
    SecureEnvironment::build().install(&mut second);

    let module = first.get_global("module");
    first.call(&module, vec![Value::string("only_here")]).unwrap();

    assert!(!first.get_global("only_here").is_nil());
    assert!(second.get_global("only_here").is_nil());
    assert!(second.loaded().get_str("only_here").is_nil());
}

/// Test: initializers produce the same surface as the builder
#[test]
fn test_initializers_match_builder() {
    let mut state = State::new();
    let base = open_secure_base(&mut state, CallArgs::new(GLOBALS_NAME, vec![], &[])).unwrap();
    let os = open_secure_os(&mut state, CallArgs::new("os", vec![], &[])).unwrap();

    let built = SecureEnvironment::build();
    let mut expected = built.globals.string_keys();
    expected.sort();
    let mut actual = base[0].as_table().unwrap().string_keys();
    actual.sort();
    assert_eq!(actual, expected);

    let mut expected = built.os.string_keys();
    expected.sort();
    let mut actual = os[0].as_table().unwrap().string_keys();
    actual.sort();
    assert_eq!(actual, expected);
}

/// Test: os functions reached through require work end to end
#[test]
fn test_os_date_through_require() {
    let mut state = State::new();
    SecureEnvironment::build().install(&mut state);

    let require = state.get_global("require");
    let os = state.call(&require, vec![Value::string("os")]).unwrap();
    let date = os[0].as_table().unwrap().get_str("date");

    let out = state
        .call(&date, vec![Value::string("!%Y"), Value::Number(0.0)])
        .unwrap();
    assert_eq!(out[0].as_str(), Some("1970"));
}

/// Test: installing again replaces the binding with the new environment
#[test]
fn test_reinstall_replaces_binding() {
    let mut state = State::new();
    let first = SecureEnvironment::build();
    let second = SecureEnvironment::build();
    first.install(&mut state);
    second.install(&mut state);

    assert!(state.globals().ptr_eq(&second.globals));
    assert!(state
        .loaded()
        .get_str("os")
        .as_table()
        .unwrap()
        .ptr_eq(&second.os));
}
