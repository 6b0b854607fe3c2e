//! Heap object placeholder
//!
//! Objects are not produced or consumed by any instruction yet. The types
//! exist so that `Value` already has its final shape when an allocator and
//! collector are added.

use std::collections::HashMap;
use std::fmt;

use super::value::Value;

/// Opaque handle to an object owned elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(u64);

impl ObjectRef {
    pub fn from_raw(raw: u64) -> Self {
        ObjectRef(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Object record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    /// Reserved for a future collector; never read by the VM
    pub marked: bool,
    pub fields: HashMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field, returning the previous value if the key existed.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }
}
