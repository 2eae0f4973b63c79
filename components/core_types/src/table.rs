//! Shared, insertion-ordered tables
//!
//! A [`Table`] is a reference-counted handle; cloning it aliases the same
//! storage. Iteration with [`Table::next`] follows insertion order.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{ScriptError, ScriptResult};
use crate::value::{NativeFn, Value};

/// Hashable wrapper for values usable as table keys
///
/// Nil and NaN are rejected before a key is built.
#[derive(Debug, Clone)]
struct TableKey(Value);

impl TableKey {
    fn new(value: Value) -> ScriptResult<Self> {
        match &value {
            Value::Nil => Err(ScriptError::runtime("table index is nil")),
            Value::Number(n) if n.is_nan() => Err(ScriptError::runtime("table index is NaN")),
            _ => Ok(TableKey(value)),
        }
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.raw_equals(&other.0)
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Nil => 0u8.hash(state),
            Value::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Number(n) => {
                2u8.hash(state);
                // -0.0 and 0.0 are the same key
                let normalized = if *n == 0.0 { 0.0f64 } else { *n };
                normalized.to_bits().hash(state);
            }
            Value::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Value::Table(t) => {
                4u8.hash(state);
                t.addr().hash(state);
            }
            Value::Function(f) => {
                5u8.hash(state);
                f.addr().hash(state);
            }
        }
    }
}

/// Reference-counted associative array
///
/// # Example
///
/// ```
/// use core_types::{Table, Value};
///
/// let t = Table::new();
/// t.set_str("answer", Value::Number(42.0));
/// assert_eq!(t.get_str("answer").as_number(), Some(42.0));
/// assert!(t.get_str("missing").is_nil());
/// ```
#[derive(Clone, Default)]
pub struct Table {
    inner: Rc<RefCell<Entries>>,
}

/// Table storage
///
/// Assigning nil to a present key leaves the slot in place holding nil, so
/// a traversal that clears the entry it just visited can continue from it.
/// Dead slots are dropped when a new key is inserted and they make up at
/// least half of the storage.
#[derive(Default)]
struct Entries {
    map: IndexMap<TableKey, Value>,
    dead: usize,
}

impl Entries {
    fn live(&self) -> usize {
        self.map.len() - self.dead
    }

    fn assign(&mut self, key: TableKey, value: Value) {
        if let Some(slot) = self.map.get_mut(&key) {
            match (slot.is_nil(), value.is_nil()) {
                (true, false) => self.dead -= 1,
                (false, true) => self.dead += 1,
                _ => {}
            }
            *slot = value;
            return;
        }
        if value.is_nil() {
            return;
        }
        if self.dead > 0 && self.dead >= self.live() {
            self.map.retain(|_, v| !v.is_nil());
            self.dead = 0;
        }
        self.map.insert(key, value);
    }

    fn live_keys(&self) -> impl Iterator<Item = &TableKey> {
        self.map
            .iter()
            .filter(|(_, v)| !v.is_nil())
            .map(|(k, _)| k)
    }
}

// Tables may contain themselves, so Debug does not descend into entries
impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table({:#x}, {} entries)", self.addr(), self.len())
    }
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table of native functions
    pub fn from_functions(entries: &[(&str, NativeFn)]) -> Self {
        let table = Table::new();
        for (name, func) in entries {
            table.set_str(name, Value::native(*name, *func));
        }
        table
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address used for identity hashing and display
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    /// Look up a key; missing keys read as nil
    pub fn get(&self, key: &Value) -> Value {
        match TableKey::new(key.clone()) {
            Ok(key) => self.inner.borrow().map.get(&key).cloned().unwrap_or_default(),
            Err(_) => Value::Nil,
        }
    }

    /// Look up a string key
    pub fn get_str(&self, key: &str) -> Value {
        self.get(&Value::string(key))
    }

    /// Look up an integer key
    pub fn get_index(&self, index: usize) -> Value {
        self.get(&Value::Number(index as f64))
    }

    /// Assign a key; assigning nil removes the entry
    ///
    /// Clearing existing entries is allowed while a traversal is in
    /// progress. Adding new keys during a traversal is not.
    pub fn set(&self, key: Value, value: Value) -> ScriptResult<()> {
        let key = TableKey::new(key)?;
        self.inner.borrow_mut().assign(key, value);
        Ok(())
    }

    /// Assign a string key
    pub fn set_str(&self, key: &str, value: Value) {
        self.inner
            .borrow_mut()
            .assign(TableKey(Value::string(key)), value);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.borrow().live()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length operator: the border `n` where `t[n]` is set and `t[n+1]` is nil
    pub fn border(&self) -> usize {
        let mut n = 0;
        while !self.get_index(n + 1).is_nil() {
            n += 1;
        }
        n
    }

    /// Entry following `key` in traversal order, `None` past the end
    ///
    /// A nil key starts the traversal. A key cleared during the traversal
    /// is still accepted; a key never present in the table is an error.
    pub fn next(&self, key: &Value) -> ScriptResult<Option<(Value, Value)>> {
        let entries = self.inner.borrow();
        let start = if key.is_nil() {
            0
        } else {
            let key = TableKey::new(key.clone())?;
            match entries.map.get_index_of(&key) {
                Some(idx) => idx + 1,
                None => return Err(ScriptError::runtime("invalid key to 'next'")),
            }
        };
        Ok(entries
            .map
            .iter()
            .skip(start)
            .find(|(_, v)| !v.is_nil())
            .map(|(k, v)| (k.0.clone(), v.clone())))
    }

    /// Keys in traversal order
    pub fn keys(&self) -> Vec<Value> {
        self.inner.borrow().live_keys().map(|k| k.0.clone()).collect()
    }

    /// String keys in traversal order
    pub fn string_keys(&self) -> Vec<String> {
        self.inner
            .borrow()
            .live_keys()
            .filter_map(|k| k.0.as_str().map(str::to_string))
            .collect()
    }
}
