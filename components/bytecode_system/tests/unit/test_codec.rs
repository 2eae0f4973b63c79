//! Tests for encode/decode and marshaling of prototype trees

use bytecode_system::{
    decode, encode, from_bytes, marshal, to_bytes, unmarshal, Constant, ConstantContainer,
    DbgCall, DbgLocalInfo, DecodeError, FunctionProto, MAX_NESTING,
};

fn fully_populated(name: &str) -> FunctionProto {
    let mut proto = FunctionProto::new(name);
    proto.line_defined = 4;
    proto.last_line_defined = 19;
    proto.num_upvalues = 2;
    proto.num_parameters = 3;
    proto.is_var_arg = 2;
    proto.num_used_registers = 9;
    proto.push_instruction(0x0000_0101, 4);
    proto.push_instruction(0x8000_4002, 5);
    proto.push_instruction(0xffff_ffff, 19);
    proto.add_constant(Constant::from("print"));
    proto.add_constant(Constant::Number(-0.25));
    proto.add_constant(Constant::from(""));
    proto.dbg_locals.push(DbgLocalInfo {
        name: "i".to_string(),
        register: 1,
        start_pc: 0,
        end_pc: 2,
    });
    proto.dbg_calls.push(DbgCall {
        name: "print".to_string(),
        pc: 1,
    });
    proto.dbg_upvalues = vec!["_ENV".to_string(), "count".to_string()];
    proto
}

/// A single-child chain whose leaf sits `levels` below the root
fn chain(levels: usize) -> FunctionProto {
    let mut node = FunctionProto::new("leaf");
    node.add_constant(Constant::from("bottom"));
    node.push_instruction(1, 1);
    for _ in 0..levels {
        let mut parent = FunctionProto::new("level");
        parent.add_child(node);
        node = parent;
    }
    node
}

#[test]
fn test_end_to_end_two_constants_one_child() {
    let mut proto = FunctionProto::new("main");
    proto.add_constant(Constant::from("hello"));
    proto.add_constant(Constant::Number(3.5));
    proto.push_instruction(1, 1);
    proto.push_instruction(2, 1);
    proto.push_instruction(3, 2);
    proto.add_child(FunctionProto::new("main"));

    let bytes = marshal(&encode(&proto)).unwrap();
    let restored = decode(&unmarshal(&bytes).unwrap()).unwrap();

    assert_eq!(restored.code.len(), 3);
    assert_eq!(
        restored.constants,
        vec![Constant::String("hello".to_string()), Constant::Number(3.5)]
    );
    assert!(matches!(restored.constants[0], Constant::String(_)));
    assert!(matches!(restored.constants[1], Constant::Number(_)));
    assert_eq!(restored.function_prototypes.len(), 1);
}

#[test]
fn test_roundtrip_preserves_all_metadata() {
    let proto = fully_populated("meta");
    let restored = from_bytes(&to_bytes(&proto).unwrap()).unwrap();
    assert_eq!(restored, proto);
}

#[test]
fn test_roundtrip_preserves_tree_shape() {
    let mut root = fully_populated("root");
    let mut first = fully_populated("first");
    first.add_child(fully_populated("first.inner"));
    first.add_child(fully_populated("first.second_inner"));
    root.add_child(first);
    root.add_child(FunctionProto::new("empty"));
    let mut third = fully_populated("third");
    let mut deep = fully_populated("deep");
    deep.add_child(fully_populated("deeper"));
    third.add_child(deep);
    root.add_child(third);

    let restored = from_bytes(&to_bytes(&root).unwrap()).unwrap();

    assert_eq!(restored.node_count(), root.node_count());
    let names: Vec<_> = restored
        .children()
        .iter()
        .map(|c| c.source_name.as_str())
        .collect();
    assert_eq!(names, vec!["first", "empty", "third"]);
    assert_eq!(
        restored.children()[0].children()[1].source_name,
        "first.second_inner"
    );
    assert_eq!(restored, root);
}

#[test]
fn test_roundtrip_special_numbers() {
    let mut proto = FunctionProto::new("nums");
    proto.add_constant(Constant::Number(f64::NAN));
    proto.add_constant(Constant::Number(f64::INFINITY));
    proto.add_constant(Constant::Number(-0.0));
    proto.add_constant(Constant::Number(1e300));

    let restored = from_bytes(&to_bytes(&proto).unwrap()).unwrap();
    assert!(restored.constants[0].as_number().unwrap().is_nan());
    assert_eq!(restored.constants[1].as_number(), Some(f64::INFINITY));
    assert!(restored.constants[2]
        .as_number()
        .unwrap()
        .is_sign_negative());
    assert_eq!(restored.constants[3].as_number(), Some(1e300));
}

#[test]
fn test_decode_never_defaults_unknown_constants() {
    let mut container = encode(&fully_populated("bad"));
    container.constants.insert(1, ConstantContainer::Unsupported);

    let err = decode(&container).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnsupportedConstant { index: 1, .. }
    ));
    assert!(err.to_string().contains("constant #1"));
}

#[test]
fn test_garbage_payload_is_decode_error() {
    let result = from_bytes(b"definitely not messagepack");
    assert!(result.is_err());
}

#[test]
fn test_empty_payload_is_decode_error() {
    assert!(matches!(from_bytes(&[]), Err(DecodeError::Unmarshal(_))));
}

#[test]
fn test_encode_is_pure() {
    let proto = fully_populated("pure");
    let before = proto.clone();
    let first = encode(&proto);
    let second = encode(&proto);
    assert_eq!(first, second);
    assert_eq!(proto, before);
}

#[test]
fn test_deepest_accepted_chain_roundtrips() {
    let proto = chain(MAX_NESTING);
    let bytes = to_bytes(&proto).unwrap();
    let restored = from_bytes(&bytes).unwrap();
    assert_eq!(restored.node_count(), MAX_NESTING + 1);
    assert_eq!(restored, proto);
}

#[test]
fn test_chain_one_level_too_deep_is_rejected() {
    let bytes = to_bytes(&chain(MAX_NESTING + 1)).unwrap();
    assert!(matches!(
        from_bytes(&bytes),
        Err(DecodeError::NestingTooDeep { .. })
    ));
}

#[test]
fn test_far_too_deep_payload_is_unmarshal_error() {
    // {"FunctionPrototypes": [ ... ]} nested without ever building a tree
    let mut bytes = Vec::new();
    for _ in 0..MAX_NESTING * 5 {
        bytes.push(0x81);
        bytes.push(0xa0 | 18);
        bytes.extend_from_slice(b"FunctionPrototypes");
        bytes.push(0x91);
    }
    bytes.push(0x80);
    assert!(matches!(unmarshal(&bytes), Err(DecodeError::Unmarshal(_))));
}

#[test]
fn test_unmarshal_deep_chain_from_small_stack_thread() {
    let bytes = to_bytes(&chain(MAX_NESTING)).unwrap();
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(move || unmarshal(&bytes).map(|c| c.function_prototypes.len()))
        .unwrap();
    assert_eq!(handle.join().unwrap().unwrap(), 1);
}
