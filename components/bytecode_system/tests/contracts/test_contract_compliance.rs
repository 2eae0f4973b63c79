//! Contract compliance tests for bytecode_system
//! Verifies the public surface hosts and the loader rely on

use bytecode_system::{
    decode, dump, encode, has_signature, marshal, undump, unmarshal, Constant, DecodeError,
    EncodeError, FunctionProto, PeekReader, ProtoContainer, SIGNATURE,
};

/// Signature is exactly four bytes
#[test]
fn test_contract_signature_length() {
    assert_eq!(SIGNATURE.len(), 4);
    assert!(has_signature(&SIGNATURE));
}

/// Constant pool admits exactly two kinds
#[test]
fn test_contract_constant_kinds() {
    let s = Constant::String(String::new());
    let n = Constant::Number(0.0);
    for c in [&s, &n] {
        match c {
            Constant::String(_) => assert_eq!(c.kind(), "String"),
            Constant::Number(_) => assert_eq!(c.kind(), "Number"),
        }
    }
}

/// Encode/decode and marshal/unmarshal signatures
#[test]
fn test_contract_codec_signatures() {
    let _encode: fn(&FunctionProto) -> ProtoContainer = encode;
    let _decode: fn(&ProtoContainer) -> Result<FunctionProto, DecodeError> = decode;
    let _marshal: fn(&ProtoContainer) -> Result<Vec<u8>, EncodeError> = marshal;
    let _unmarshal: fn(&[u8]) -> Result<ProtoContainer, DecodeError> = unmarshal;
    let _undump: fn(&[u8]) -> Result<Option<FunctionProto>, DecodeError> = undump;
}

/// Container is a field-for-field mirror of the prototype
#[test]
fn test_contract_container_mirror() {
    let mut proto = FunctionProto::new("mirror");
    proto.line_defined = 1;
    proto.last_line_defined = 2;
    proto.num_upvalues = 3;
    proto.num_parameters = 4;
    proto.is_var_arg = 1;
    proto.num_used_registers = 6;
    proto.push_instruction(77, 1);
    proto.add_child(FunctionProto::new("child"));

    let c = encode(&proto);
    assert_eq!(c.source_name, proto.source_name);
    assert_eq!(c.line_defined, proto.line_defined);
    assert_eq!(c.last_line_defined, proto.last_line_defined);
    assert_eq!(c.num_upvalues, proto.num_upvalues);
    assert_eq!(c.num_parameters, proto.num_parameters);
    assert_eq!(c.is_var_arg, proto.is_var_arg);
    assert_eq!(c.num_used_registers, proto.num_used_registers);
    assert_eq!(c.code, proto.code);
    assert_eq!(c.dbg_source_positions, proto.dbg_source_positions);
    assert_eq!(c.function_prototypes.len(), 1);
}

/// Artifacts are the signature followed by one marshaled container
#[test]
fn test_contract_artifact_layout() {
    let proto = FunctionProto::new("layout");
    let mut artifact = Vec::new();
    dump(&proto, &mut artifact).unwrap();

    assert_eq!(&artifact[..4], &SIGNATURE[..]);
    let container = unmarshal(&artifact[4..]).unwrap();
    assert_eq!(container, encode(&proto));
}

/// PeekReader is a std reader
#[test]
fn test_contract_peek_reader_is_bufread() {
    fn assert_bufread<T: std::io::BufRead>(_: &T) {}
    let reader = PeekReader::new(&b""[..]);
    assert_bufread(&reader);
}
