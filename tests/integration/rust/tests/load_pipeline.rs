//! Save/Load Pipeline Integration Tests
//!
//! Tests the complete flow: FunctionProto -> dump -> stream -> Loader ->
//! closure bound to a secure environment -> execution

use std::rc::Rc;

use builtins::SecureEnvironment;
use bytecode_system::{dump, encode, marshal, unmarshal, decode, Constant, FunctionProto};
use core_types::{Function, State, Value};
use integration_tests::CallFirstConstant;
use loader::{Chunk, Loader};

fn call_proto(callee: &str, args: &[Constant]) -> FunctionProto {
    let mut proto = FunctionProto::new("@pipeline.lua");
    proto.add_constant(Constant::from(callee));
    for arg in args {
        proto.add_constant(arg.clone());
    }
    proto.push_instruction(0x0000_0001, 1);
    proto.push_instruction(0x0100_001c, 1);
    proto.push_instruction(0x0080_001e, 1);
    proto
}

fn sandboxed_state() -> State {
    let mut state = State::new().with_executor(Rc::new(CallFirstConstant));
    SecureEnvironment::build().install(&mut state);
    state
}

fn load(state: &State, proto: &FunctionProto) -> Value {
    let mut artifact = Vec::new();
    dump(proto, &mut artifact).unwrap();
    match Loader::new()
        .load(state, &artifact[..], &state.globals())
        .unwrap()
    {
        Chunk::Precompiled(closure) => closure,
        Chunk::Source(_) => panic!("artifact was not recognised"),
    }
}

/// Test: the reference tree survives Encode -> marshal -> unmarshal -> Decode
#[test]
fn test_reference_tree_round_trip() {
    let mut proto = FunctionProto::new("@ref.lua");
    proto.add_constant(Constant::from("hello"));
    proto.add_constant(Constant::from(3.5));
    proto.push_instruction(1, 1);
    proto.push_instruction(2, 2);
    proto.push_instruction(3, 3);
    proto.add_child(FunctionProto::new("@ref.lua"));

    let bytes = marshal(&encode(&proto)).unwrap();
    let restored = decode(&unmarshal(&bytes).unwrap()).unwrap();

    assert_eq!(restored.code.len(), 3);
    assert_eq!(
        restored.constants,
        vec![Constant::String("hello".into()), Constant::Number(3.5)]
    );
    assert_eq!(restored.function_prototypes.len(), 1);
}

/// Test: a loaded closure runs against the sandbox it was bound to
#[test]
fn test_loaded_closure_calls_allowlisted_global() {
    let mut state = sandboxed_state();
    let closure = load(&state, &call_proto("tostring", &[Constant::from(3.5)]));

    let out = state.call(&closure, vec![]).unwrap();
    assert_eq!(out[0].as_str(), Some("3.5"));
}

/// Test: globals outside the allowlist are unreachable from loaded code
#[test]
fn test_loaded_closure_cannot_reach_missing_global() {
    let mut state = sandboxed_state();
    let closure = load(&state, &call_proto("dofile", &[Constant::from("/etc/passwd")]));

    let err = state.call(&closure, vec![]).unwrap_err();
    assert_eq!(err.to_string(), "attempt to call a nil value");
}

/// Test: loaded code can require the os module but not others
#[test]
fn test_loaded_closure_requires_os() {
    let mut state = sandboxed_state();
    let closure = load(&state, &call_proto("require", &[Constant::from("os")]));

    let out = state.call(&closure, vec![]).unwrap();
    let os = out[0].as_table().unwrap();
    let mut names = os.string_keys();
    names.sort();
    assert_eq!(names, vec!["clock", "date", "difftime", "time"]);

    let closure = load(&state, &call_proto("require", &[Constant::from("io")]));
    assert!(state.call(&closure, vec![]).is_err());
}

/// Test: the closure environment is the one the caller supplied
#[test]
fn test_closure_env_is_caller_supplied() {
    let state = sandboxed_state();
    let private = SecureEnvironment::build();

    let mut artifact = Vec::new();
    dump(&call_proto("type", &[]), &mut artifact).unwrap();
    let chunk = Loader::new()
        .load(&state, &artifact[..], &private.globals)
        .unwrap();

    match chunk {
        Chunk::Precompiled(Value::Function(Function::Closure(c))) => {
            assert!(c.env.ptr_eq(&private.globals));
            assert!(!c.env.ptr_eq(&state.globals()));
        }
        _ => panic!("expected a compiled closure"),
    }
}

/// Test: call arguments follow the constant arguments
#[test]
fn test_loaded_closure_receives_call_arguments() {
    let mut state = sandboxed_state();
    let closure = load(&state, &call_proto("type", &[]));

    let out = state.call(&closure, vec![Value::Boolean(false)]).unwrap();
    assert_eq!(out[0].as_str(), Some("boolean"));
}
