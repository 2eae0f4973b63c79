//! Conversion between prototype trees and their container mirror
//!
//! [`encode`] and [`decode`] walk the tree depth-first. Each node's own
//! fields are copied before its children are visited, and children keep
//! their original order. [`dump`] and [`undump`] add the marshaling step
//! and the artifact signature on top.

use std::io::Write;

use tracing::debug;

use crate::container::{
    marshal, unmarshal, CallContainer, ConstantContainer, LocalContainer, ProtoContainer,
};
use crate::error::{DecodeError, EncodeError};
use crate::proto::{Constant, DbgCall, DbgLocalInfo, FunctionProto};
use crate::signature::SIGNATURE;

/// Deepest child nesting accepted when decoding untrusted payloads
pub const MAX_NESTING: usize = 200;

/// Mirror a prototype tree into a container tree
///
/// # Example
///
/// ```
/// use bytecode_system::{decode, encode, Constant, FunctionProto};
///
/// let mut proto = FunctionProto::new("main");
/// proto.add_constant(Constant::Number(3.5));
/// proto.push_instruction(1, 1);
///
/// let restored = decode(&encode(&proto)).unwrap();
/// assert_eq!(restored, proto);
/// ```
pub fn encode(proto: &FunctionProto) -> ProtoContainer {
    let container = encode_node(proto);
    debug!(
        source = %proto.source_name,
        prototypes = proto.node_count(),
        "encoded prototype tree"
    );
    container
}

fn encode_node(proto: &FunctionProto) -> ProtoContainer {
    let mut container = ProtoContainer {
        source_name: proto.source_name.clone(),
        line_defined: proto.line_defined,
        last_line_defined: proto.last_line_defined,
        num_upvalues: proto.num_upvalues,
        num_parameters: proto.num_parameters,
        is_var_arg: proto.is_var_arg,
        num_used_registers: proto.num_used_registers,
        code: proto.code.clone(),
        constants: proto.constants.iter().map(encode_constant).collect(),
        function_prototypes: Vec::with_capacity(proto.function_prototypes.len()),
        dbg_source_positions: proto.dbg_source_positions.clone(),
        dbg_locals: proto
            .dbg_locals
            .iter()
            .map(|local| LocalContainer {
                name: local.name.clone(),
                register: local.register,
                start_pc: local.start_pc,
                end_pc: local.end_pc,
            })
            .collect(),
        dbg_calls: proto
            .dbg_calls
            .iter()
            .map(|call| CallContainer {
                name: call.name.clone(),
                pc: call.pc,
            })
            .collect(),
        dbg_upvalues: proto.dbg_upvalues.clone(),
        string_constants: proto.string_constants.clone(),
    };

    for child in &proto.function_prototypes {
        container.function_prototypes.push(encode_node(child));
    }
    container
}

fn encode_constant(constant: &Constant) -> ConstantContainer {
    match constant {
        Constant::String(s) => ConstantContainer::String { value: s.clone() },
        Constant::Number(n) => ConstantContainer::Number { value: *n },
    }
}

/// Rebuild a prototype tree from a container tree
///
/// Fails on the first structurally invalid node; no partial tree is
/// returned. The string pool is recomputed from the decoded constants
/// rather than trusted from the payload.
pub fn decode(container: &ProtoContainer) -> Result<FunctionProto, DecodeError> {
    let mut path = String::from("root");
    let proto = decode_node(container, &mut path, 0)?;
    debug!(
        source = %proto.source_name,
        prototypes = proto.node_count(),
        "decoded prototype tree"
    );
    Ok(proto)
}

fn decode_node(
    container: &ProtoContainer,
    path: &mut String,
    depth: usize,
) -> Result<FunctionProto, DecodeError> {
    if depth > MAX_NESTING {
        return Err(DecodeError::NestingTooDeep { limit: MAX_NESTING });
    }

    if container.code.len() != container.dbg_source_positions.len() {
        return Err(DecodeError::LengthMismatch {
            path: path.clone(),
            code: container.code.len(),
            positions: container.dbg_source_positions.len(),
        });
    }

    let mut constants = Vec::with_capacity(container.constants.len());
    for (index, constant) in container.constants.iter().enumerate() {
        let constant = match constant {
            ConstantContainer::String { value } => Constant::String(value.clone()),
            ConstantContainer::Number { value } => Constant::Number(*value),
            ConstantContainer::Unsupported => {
                return Err(DecodeError::UnsupportedConstant {
                    path: path.clone(),
                    index,
                })
            }
        };
        constants.push(constant);
    }

    let mut proto = FunctionProto {
        source_name: container.source_name.clone(),
        line_defined: container.line_defined,
        last_line_defined: container.last_line_defined,
        num_upvalues: container.num_upvalues,
        num_parameters: container.num_parameters,
        is_var_arg: container.is_var_arg,
        num_used_registers: container.num_used_registers,
        code: container.code.clone(),
        constants,
        function_prototypes: Vec::with_capacity(container.function_prototypes.len()),
        dbg_source_positions: container.dbg_source_positions.clone(),
        dbg_locals: container
            .dbg_locals
            .iter()
            .map(|local| DbgLocalInfo {
                name: local.name.clone(),
                register: local.register,
                start_pc: local.start_pc,
                end_pc: local.end_pc,
            })
            .collect(),
        dbg_calls: container
            .dbg_calls
            .iter()
            .map(|call| DbgCall {
                name: call.name.clone(),
                pc: call.pc,
            })
            .collect(),
        dbg_upvalues: container.dbg_upvalues.clone(),
        string_constants: Vec::new(),
    };
    proto.rebuild_string_constants();

    for (index, child) in container.function_prototypes.iter().enumerate() {
        let parent_len = path.len();
        path.push('/');
        path.push_str(&index.to_string());
        let decoded = decode_node(child, path, depth + 1)?;
        path.truncate(parent_len);
        proto.function_prototypes.push(decoded);
    }

    Ok(proto)
}

/// Encode and marshal a prototype tree, without the signature
pub fn to_bytes(proto: &FunctionProto) -> Result<Vec<u8>, EncodeError> {
    marshal(&encode(proto))
}

/// Unmarshal and decode a payload that has had its signature removed
pub fn from_bytes(bytes: &[u8]) -> Result<FunctionProto, DecodeError> {
    decode(&unmarshal(bytes)?)
}

/// Write a complete precompiled artifact: signature followed by payload
pub fn dump<W: Write>(proto: &FunctionProto, mut writer: W) -> Result<(), EncodeError> {
    let payload = to_bytes(proto)?;
    writer.write_all(&SIGNATURE)?;
    writer.write_all(&payload)?;
    writer.flush()?;
    debug!(bytes = payload.len() + SIGNATURE.len(), "artifact written");
    Ok(())
}

/// Decode a complete in-memory artifact
///
/// Returns `Ok(None)` when the buffer does not start with the signature,
/// meaning it holds source text.
pub fn undump(artifact: &[u8]) -> Result<Option<FunctionProto>, DecodeError> {
    match artifact.strip_prefix(&SIGNATURE[..]) {
        Some(payload) => from_bytes(payload).map(Some),
        None => Ok(None),
    }
}
