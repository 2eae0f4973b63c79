//! Unit tests for Table

use core_types::{CallArgs, ScriptResult, State, Table, Value};

fn noop(_: &mut State, _: CallArgs<'_>) -> ScriptResult<Vec<Value>> {
    Ok(vec![])
}

#[test]
fn test_from_functions() {
    let t = Table::from_functions(&[("a", noop), ("b", noop)]);
    assert_eq!(t.string_keys(), vec!["a", "b"]);
    assert_eq!(t.get_str("a").type_name(), "function");
}

#[test]
fn test_traversal_after_removal() {
    let t = Table::new();
    t.set_str("a", Value::Number(1.0));
    t.set_str("b", Value::Number(2.0));
    t.set_str("c", Value::Number(3.0));

    t.set_str("c", Value::Nil);
    let (k, _) = t.next(&Value::Nil).unwrap().unwrap();
    assert_eq!(k.as_str(), Some("a"));
    let (k, _) = t.next(&k).unwrap().unwrap();
    assert_eq!(k.as_str(), Some("b"));
    assert!(t.next(&k).unwrap().is_none());
}

#[test]
fn test_keys_mixed() {
    let t = Table::new();
    t.set(Value::Number(1.0), Value::Boolean(true)).unwrap();
    t.set_str("x", Value::Boolean(true));
    assert_eq!(t.keys().len(), 2);
    assert_eq!(t.string_keys(), vec!["x"]);
}
