//! Runtime Value Representation
//!
//! Defines the tagged value carried on the operand stack, in global slots,
//! and (in the future) in object fields.

use std::fmt;

use super::object::ObjectRef;

/// Value tag, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Absent,
    Integer,
    Float,
    Object,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Absent => "undefined",
            ValueType::Integer => "i64",
            ValueType::Float => "f64",
            ValueType::Object => "object",
        }
    }
}

/// Runtime value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Absent,

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit float (IEEE 754)
    Float(f64),

    /// Weak handle to an object; the value does not own it
    Object(ObjectRef),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Absent => ValueType::Absent,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectRef> {
        match *self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(r: ObjectRef) -> Self {
        Value::Object(r)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "undefined"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Object(r) => write!(f, "{}", r),
        }
    }
}
