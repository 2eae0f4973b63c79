//! Engine instance state
//!
//! [`State`] holds what a running engine instance owns on behalf of the
//! libraries in this workspace: the globals binding, the module registry
//! and the hooks the host provides for running compiled code.

use std::rc::Rc;
use std::time::Instant;

use bytecode_system::FunctionProto;
use tracing::trace;

use crate::args::CallArgs;
use crate::error::{ScriptError, ScriptResult};
use crate::table::Table;
use crate::value::{Closure, Function, NativeFn, Value};

/// Name under which the globals table is registered
pub const GLOBALS_NAME: &str = "_G";

/// Runs compiled closures on behalf of a [`State`]
///
/// The instruction loop lives in the host; this is the seam it plugs into.
pub trait Executor {
    /// Execute `closure` with `args` and return its results
    fn execute(
        &self,
        state: &mut State,
        closure: Rc<Closure>,
        args: Vec<Value>,
    ) -> ScriptResult<Vec<Value>>;
}

/// One engine instance
///
/// # Example
///
/// ```
/// use core_types::{State, Value};
///
/// let mut state = State::new();
/// state.set_global("answer", Value::Number(42.0));
/// assert_eq!(state.get_global("answer").as_number(), Some(42.0));
/// ```
pub struct State {
    globals: Table,
    loaded: Table,
    preload: Table,
    started: Instant,
    executor: Option<Rc<dyn Executor>>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// Create an instance with empty globals and registries
    pub fn new() -> Self {
        Self {
            globals: Table::new(),
            loaded: Table::new(),
            preload: Table::new(),
            started: Instant::now(),
            executor: None,
        }
    }

    /// Install an executor for compiled closures
    pub fn with_executor(mut self, executor: Rc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Replace the executor for compiled closures
    pub fn set_executor(&mut self, executor: Rc<dyn Executor>) {
        self.executor = Some(executor);
    }

    /// Current globals binding
    pub fn globals(&self) -> Table {
        self.globals.clone()
    }

    /// Replace the globals binding
    pub fn set_globals(&mut self, globals: Table) {
        self.globals = globals;
    }

    /// Environment new top-level functions bind to
    pub fn current_env(&self) -> Table {
        self.globals.clone()
    }

    /// Read a global
    pub fn get_global(&self, name: &str) -> Value {
        self.globals.get_str(name)
    }

    /// Write a global
    pub fn set_global(&self, name: &str, value: Value) {
        self.globals.set_str(name, value);
    }

    /// Registry of loaded modules, keyed by module name
    pub fn loaded(&self) -> Table {
        self.loaded.clone()
    }

    /// Registry of module openers consulted by `require`
    pub fn preload(&self) -> Table {
        self.preload.clone()
    }

    /// Register an opener for `require(name)`
    pub fn set_preload(&self, name: &str, opener: NativeFn) {
        self.preload.set_str(name, Value::native(name, opener));
    }

    /// When this instance was created
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Register a module of native functions and return its table
    ///
    /// [`GLOBALS_NAME`] targets the globals binding itself. Any other name
    /// reuses `loaded[name]` if it is a table and creates it otherwise.
    pub fn register_module(&mut self, name: &str, entries: &[(&str, NativeFn)]) -> Table {
        let module = if name == GLOBALS_NAME {
            self.globals.clone()
        } else {
            match self.loaded.get_str(name) {
                Value::Table(existing) => existing,
                _ => Table::new(),
            }
        };

        for (field, func) in entries {
            module.set_str(field, Value::native(*field, *func));
        }
        self.loaded.set_str(name, Value::Table(module.clone()));
        trace!(module = name, entries = entries.len(), "module registered");
        module
    }

    /// Bind a compiled prototype into a callable closure
    ///
    /// The closure resolves free names against `env`. Its `nupvalues`
    /// upvalue slots start out nil.
    pub fn new_closure(&self, proto: Rc<FunctionProto>, env: Table, nupvalues: usize) -> Value {
        Value::Function(Function::Closure(Rc::new(Closure {
            proto,
            env,
            upvalues: vec![Value::Nil; nupvalues],
        })))
    }

    /// Call a function value
    pub fn call(&mut self, function: &Value, args: Vec<Value>) -> ScriptResult<Vec<Value>> {
        match function {
            Value::Function(Function::Native(native)) => {
                let native = Rc::clone(native);
                (native.func)(self, CallArgs::new(&native.name, args, &native.upvalues))
            }
            Value::Function(Function::Closure(closure)) => match self.executor.clone() {
                Some(executor) => executor.execute(self, Rc::clone(closure), args),
                None => Err(ScriptError::runtime(
                    "no executor installed for compiled functions",
                )),
            },
            other => Err(ScriptError::runtime(format!(
                "attempt to call a {} value",
                other.type_name()
            ))),
        }
    }
}
