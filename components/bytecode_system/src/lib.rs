//! Bytecode interchange for compiled script functions
//!
//! This crate provides the compiled function representation shared with the
//! engine and a portable binary form of it, so compiled scripts can be
//! stored and loaded again without recompiling.
//!
//! # Features
//!
//! - [`FunctionProto`] trees with constants, nested functions and debug tables
//! - Encode/decode to a wire-safe [`ProtoContainer`] mirror
//! - Self-describing MessagePack marshaling of containers
//! - Non-destructive signature sniffing on input streams
//!
//! # Example
//!
//! ```
//! use bytecode_system::{dump, undump, Constant, FunctionProto};
//!
//! let mut proto = FunctionProto::new("main.lua");
//! proto.add_constant(Constant::from("hello"));
//! proto.push_instruction(0x0000_0001, 1);
//!
//! // Save
//! let mut artifact = Vec::new();
//! dump(&proto, &mut artifact).unwrap();
//!
//! // Load
//! let restored = undump(&artifact).unwrap().unwrap();
//! assert_eq!(restored, proto);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod container;
pub mod error;
pub mod proto;
pub mod signature;

// Re-export main types at crate root
pub use codec::{decode, dump, encode, from_bytes, to_bytes, undump, MAX_NESTING};
pub use container::{
    marshal, unmarshal, CallContainer, ConstantContainer, LocalContainer, ProtoContainer,
    MAX_WIRE_DEPTH,
};
pub use error::{DecodeError, EncodeError};
pub use proto::{Constant, DbgCall, DbgLocalInfo, FunctionProto, Instruction};
pub use signature::{has_signature, peek_signature, PeekReader, SIGNATURE};
