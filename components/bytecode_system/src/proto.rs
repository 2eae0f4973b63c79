//! Function prototypes - the compiled form of one function body
//!
//! A prototype owns its instructions, its constant pool, its nested child
//! prototypes and the debug tables that run alongside the code.

use serde::{Deserialize, Serialize};

/// A single encoded instruction word
pub type Instruction = u32;

/// Value stored in a prototype's constant pool
///
/// Instructions refer to constants by index, so pool order is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constant {
    /// String literal
    String(String),
    /// Numeric literal (IEEE 754 double)
    Number(#[serde(with = "number_text")] f64),
}

/// Non-finite numbers as `"nan"`, `"inf"` and `"-inf"` in text formats
///
/// JSON has no literal for them, so a plain `f64` would come back as
/// `null` and fail to load again. Binary formats keep the raw double.
mod number_text {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if n.is_finite() || !serializer.is_human_readable() {
            serializer.serialize_f64(*n)
        } else if n.is_nan() {
            serializer.serialize_str("nan")
        } else if *n > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(NumberVisitor)
    }

    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, \"nan\", \"inf\" or \"-inf\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_f32<E: de::Error>(self, v: f32) -> Result<f64, E> {
            Ok(f64::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }
}

impl Constant {
    /// Name of the constant's kind, as used in the wire format
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::String(_) => "String",
            Constant::Number(_) => "Number",
        }
    }

    /// Try to get the string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            Constant::Number(_) => None,
        }
    }

    /// Try to get the number value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Constant::Number(n) => Some(*n),
            Constant::String(_) => None,
        }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constant::String(a), Constant::String(b)) => a == b,
            // NaN constants must survive a round trip as equal
            (Constant::Number(a), Constant::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Constant::String(s.to_string())
    }
}

impl From<String> for Constant {
    fn from(s: String) -> Self {
        Constant::String(s)
    }
}

impl From<f64> for Constant {
    fn from(n: f64) -> Self {
        Constant::Number(n)
    }
}

/// Local variable symbol record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbgLocalInfo {
    /// Variable name
    pub name: String,
    /// Register holding the variable
    pub register: u8,
    /// First instruction where the variable is live
    pub start_pc: i32,
    /// Instruction where the variable goes out of scope
    pub end_pc: i32,
}

/// Call-site record keyed to an instruction position
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbgCall {
    /// Name of the callee as written at the call site
    pub name: String,
    /// Instruction index of the call
    pub pc: i32,
}

/// Compiled representation of a function body
///
/// Child prototypes are owned exclusively by their parent, so a prototype
/// is always a tree.
///
/// # Example
///
/// ```
/// use bytecode_system::{Constant, FunctionProto};
///
/// let mut proto = FunctionProto::new("main.lua");
/// let idx = proto.add_constant(Constant::from("hello"));
/// proto.push_instruction(0x0000_0001, 1);
///
/// assert_eq!(idx, 0);
/// assert_eq!(proto.code.len(), proto.dbg_source_positions.len());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionProto {
    /// Chunk name the function was compiled from
    pub source_name: String,
    /// Line where the function definition starts
    pub line_defined: i32,
    /// Line where the function definition ends
    pub last_line_defined: i32,
    /// Number of captured upvalues
    pub num_upvalues: u8,
    /// Number of declared parameters
    pub num_parameters: u8,
    /// Vararg flag bits
    pub is_var_arg: u8,
    /// Register file size needed by the function
    pub num_used_registers: u8,
    /// Instruction words
    pub code: Vec<Instruction>,
    /// Constant pool
    pub constants: Vec<Constant>,
    /// Nested function definitions, in definition order
    pub function_prototypes: Vec<FunctionProto>,
    /// Source line per instruction, aligned 1:1 with `code`
    pub dbg_source_positions: Vec<i32>,
    /// Local variable symbols
    pub dbg_locals: Vec<DbgLocalInfo>,
    /// Call-site records
    pub dbg_calls: Vec<DbgCall>,
    /// Upvalue names
    pub dbg_upvalues: Vec<String>,
    /// Deduplicated string constants (derived from `constants`)
    #[serde(default)]
    pub string_constants: Vec<String>,
}

impl FunctionProto {
    /// Create an empty prototype for the given chunk name
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    /// Append an instruction together with its source line
    pub fn push_instruction(&mut self, code: Instruction, line: i32) {
        self.code.push(code);
        self.dbg_source_positions.push(line);
    }

    /// Add a constant to the pool and return its index
    pub fn add_constant(&mut self, constant: Constant) -> usize {
        if let Constant::String(s) = &constant {
            if !self.string_constants.iter().any(|existing| existing == s) {
                self.string_constants.push(s.clone());
            }
        }
        let idx = self.constants.len();
        self.constants.push(constant);
        idx
    }

    /// Add a nested prototype and return its index
    pub fn add_child(&mut self, child: FunctionProto) -> usize {
        let idx = self.function_prototypes.len();
        self.function_prototypes.push(child);
        idx
    }

    /// Nested prototypes
    pub fn children(&self) -> &[FunctionProto] {
        &self.function_prototypes
    }

    /// Recompute the string pool from the constant pool
    ///
    /// The pool holds every distinct string constant in first-occurrence order.
    pub fn rebuild_string_constants(&mut self) {
        let mut pool: Vec<String> = Vec::new();
        for constant in &self.constants {
            if let Constant::String(s) = constant {
                if !pool.contains(s) {
                    pool.push(s.clone());
                }
            }
        }
        self.string_constants = pool;
    }

    /// Total number of prototypes in this tree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self
            .function_prototypes
            .iter()
            .map(FunctionProto::node_count)
            .sum::<usize>()
    }

    /// Whether the vararg flag is set
    pub fn is_vararg(&self) -> bool {
        self.is_var_arg != 0
    }
}
