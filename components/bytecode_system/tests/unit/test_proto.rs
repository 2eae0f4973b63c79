//! Tests for the FunctionProto data model

use bytecode_system::{Constant, FunctionProto};

#[test]
fn test_proto_creation() {
    let proto = FunctionProto::new("chunk");
    assert_eq!(proto.source_name, "chunk");
    assert!(proto.code.is_empty());
    assert!(proto.constants.is_empty());
    assert!(proto.children().is_empty());
    assert!(!proto.is_vararg());
}

#[test]
fn test_add_constant_returns_index() {
    let mut proto = FunctionProto::new("chunk");
    assert_eq!(proto.add_constant(Constant::Number(1.0)), 0);
    assert_eq!(proto.add_constant(Constant::from("two")), 1);
    assert_eq!(proto.constants[1].as_str(), Some("two"));
    assert_eq!(proto.constants[0].kind(), "Number");
}

#[test]
fn test_add_child_returns_index() {
    let mut proto = FunctionProto::new("chunk");
    assert_eq!(proto.add_child(FunctionProto::new("a")), 0);
    assert_eq!(proto.add_child(FunctionProto::new("b")), 1);
    assert_eq!(proto.children()[1].source_name, "b");
}

#[test]
fn test_json_interchange() {
    let mut proto = FunctionProto::new("json");
    proto.add_constant(Constant::from("x"));
    proto.add_constant(Constant::Number(2.0));
    proto.push_instruction(5, 1);
    proto.add_child(FunctionProto::new("inner"));

    let text = serde_json::to_string(&proto).unwrap();
    let back: FunctionProto = serde_json::from_str(&text).unwrap();
    assert_eq!(back, proto);
}

#[test]
fn test_json_keeps_non_finite_numbers() {
    let mut proto = FunctionProto::new("special");
    proto.add_constant(Constant::Number(f64::NAN));
    proto.add_constant(Constant::Number(f64::INFINITY));
    proto.add_constant(Constant::Number(f64::NEG_INFINITY));
    proto.add_constant(Constant::Number(-0.0));

    let text = serde_json::to_string(&proto).unwrap();
    assert!(text.contains(r#"{"Number":"nan"}"#));
    assert!(text.contains(r#"{"Number":"-inf"}"#));
    assert!(!text.contains("null"));

    let back: FunctionProto = serde_json::from_str(&text).unwrap();
    assert_eq!(back, proto);
    assert!(back.constants[3].as_number().unwrap().is_sign_negative());
}

#[test]
fn test_json_rejects_unknown_number_text() {
    let text = r#"{"Number":"infinity"}"#;
    assert!(serde_json::from_str::<Constant>(text).is_err());
    let whole: Constant = serde_json::from_str(r#"{"Number":7}"#).unwrap();
    assert_eq!(whole, Constant::Number(7.0));
}
