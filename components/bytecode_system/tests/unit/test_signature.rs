//! Tests for signature sniffing on streams

use std::io::Read;

use bytecode_system::{dump, from_bytes, peek_signature, FunctionProto, PeekReader, SIGNATURE};

#[test]
fn test_sniff_then_decode_artifact() {
    let proto = FunctionProto::new("sniffed");
    let mut artifact = Vec::new();
    dump(&proto, &mut artifact).unwrap();

    let mut reader = PeekReader::new(&artifact[..]);
    assert!(peek_signature(&mut reader));

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload).unwrap();
    assert_eq!(payload.len(), artifact.len() - SIGNATURE.len());
    assert_eq!(from_bytes(&payload).unwrap(), proto);
}

#[test]
fn test_source_text_is_not_consumed() {
    let source = "return 1 + 2\n";
    let mut reader = PeekReader::new(source.as_bytes());
    assert!(!peek_signature(&mut reader));

    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    assert_eq!(text, source);
}

#[test]
fn test_partial_signature_is_not_consumed() {
    let data = b"\x1bGoX and more";
    let mut reader = PeekReader::new(&data[..]);
    assert!(!peek_signature(&mut reader));

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, data);
}
