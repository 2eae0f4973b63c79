//! Portable container mirror of a prototype tree
//!
//! A [`ProtoContainer`] carries the same fields as a
//! [`FunctionProto`](crate::FunctionProto) using only wire-friendly types.
//! It is marshaled as MessagePack with named fields, so readers ignore
//! fields they do not know and default fields that are missing.

use std::io::{self, Cursor};
use std::panic;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec::MAX_NESTING;
use crate::error::{DecodeError, EncodeError};

/// MessagePack nesting accepted by [`unmarshal`]
///
/// Each prototype level costs a map and its child array; constants and
/// debug records add one array and one map below the deepest level.
pub const MAX_WIRE_DEPTH: usize = 2 * MAX_NESTING + 8;

/// Stack given to the thread that runs the recursive serde walk
const CODEC_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Wire form of a constant pool entry
///
/// Encoded as a map tagged by `Kind`. Tags other than `String` and
/// `Number` deserialize as [`ConstantContainer::Unsupported`], which
/// decoding rejects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Kind")]
pub enum ConstantContainer {
    /// String literal
    String {
        /// Literal text
        #[serde(rename = "Value")]
        value: String,
    },
    /// Numeric literal
    Number {
        /// Literal value
        #[serde(rename = "Value")]
        value: f64,
    },
    /// Any other kind found in an untrusted payload
    #[serde(other)]
    Unsupported,
}

/// Wire form of a local variable record
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LocalContainer {
    pub name: String,
    pub register: u8,
    pub start_pc: i32,
    pub end_pc: i32,
}

/// Wire form of a call-site record
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CallContainer {
    pub name: String,
    pub pc: i32,
}

/// Field-for-field mirror of a prototype, owning its mirrored children
///
/// Fields carry the same meaning as their counterparts on `FunctionProto`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProtoContainer {
    pub source_name: String,
    pub line_defined: i32,
    pub last_line_defined: i32,
    pub num_upvalues: u8,
    pub num_parameters: u8,
    pub is_var_arg: u8,
    pub num_used_registers: u8,
    pub code: Vec<u32>,
    pub constants: Vec<ConstantContainer>,
    pub function_prototypes: Vec<ProtoContainer>,
    pub dbg_source_positions: Vec<i32>,
    pub dbg_locals: Vec<LocalContainer>,
    pub dbg_calls: Vec<CallContainer>,
    pub dbg_upvalues: Vec<String>,
    pub string_constants: Vec<String>,
}

/// Serialize a container to MessagePack bytes
pub fn marshal(container: &ProtoContainer) -> Result<Vec<u8>, EncodeError> {
    let bytes = on_codec_stack(|| rmp_serde::to_vec_named(container))
        .map_err(EncodeError::Stack)??;
    trace!(bytes = bytes.len(), "container marshaled");
    Ok(bytes)
}

/// Deserialize exactly one container from MessagePack bytes
///
/// The payload must end where the container value ends, and may not nest
/// deeper than [`MAX_WIRE_DEPTH`].
pub fn unmarshal(bytes: &[u8]) -> Result<ProtoContainer, DecodeError> {
    let (container, consumed) = on_codec_stack(|| {
        let mut cursor = Cursor::new(bytes);
        let container = {
            let mut deserializer = rmp_serde::Deserializer::new(&mut cursor);
            deserializer.set_max_depth(MAX_WIRE_DEPTH);
            ProtoContainer::deserialize(&mut deserializer)?
        };
        Ok::<_, DecodeError>((container, cursor.position() as usize))
    })
    .map_err(DecodeError::Stack)??;

    if consumed != bytes.len() {
        return Err(DecodeError::TrailingBytes {
            consumed,
            total: bytes.len(),
        });
    }

    trace!(bytes = bytes.len(), "container unmarshaled");
    Ok(container)
}

/// Run `f` on a scoped thread with [`CODEC_STACK_SIZE`] bytes of stack
///
/// The serde walk recurses once per nesting level, which at the accepted
/// depth can outgrow the caller's stack in unoptimized builds.
fn on_codec_stack<T, F>(f: F) -> io::Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("chunk-codec".to_string())
            .stack_size(CODEC_STACK_SIZE)
            .spawn_scoped(scope, f)?;
        match handle.join() {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}
