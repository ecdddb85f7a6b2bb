//! Materialized values.

use std::{any::Any, fmt};

use ahash::AHashMap;

use crate::record::GenericRecord;

/// A value of the logical object model.
///
/// Composite values own their children, so cloning a `Value` is always a deep
/// copy: no two values ever share mutable state.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    /// Dynamic enumeration symbol.
    Enum(String),
    /// Dynamic fixed-length binary.
    Fixed(Vec<u8>),
    Array(Vec<Value>),
    Map(AHashMap<String, Value>),
    /// Dynamic record.
    Record(GenericRecord),
    /// An instance of a statically-known class (record, enum or fixed) produced
    /// through an object factory.
    Specific(Box<dyn SpecificValue>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text of strings and dynamic enum symbols.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the content of bytes and dynamic fixed values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::Fixed(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AHashMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&GenericRecord> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut GenericRecord> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Downcasts a statically-typed instance to its concrete class.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Specific(specific) => (**specific).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Value::Specific(specific) => (**specific).as_any_mut().downcast_mut::<T>(),
            _ => None,
        }
    }

    /// Wraps an instance of a statically-known class.
    pub fn specific<T: SpecificValue>(value: T) -> Value {
        Value::Specific(Box::new(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// An instance of a statically-known class carried inside a [`Value`].
///
/// Implemented for every `'static` type that is `Debug + Clone + PartialEq`,
/// so concrete classes only need the usual derives.
pub trait SpecificValue: Any + fmt::Debug + Send + Sync {
    fn clone_boxed(&self) -> Box<dyn SpecificValue>;

    fn eq_dyn(&self, other: &dyn SpecificValue) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> SpecificValue for T
where
    T: Any + fmt::Debug + Clone + PartialEq + Send + Sync,
{
    fn clone_boxed(&self) -> Box<dyn SpecificValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn SpecificValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Clone for Box<dyn SpecificValue> {
    fn clone(&self) -> Self {
        // Dispatch on the boxed value, not on the box itself.
        (**self).clone_boxed()
    }
}

impl PartialEq for dyn SpecificValue {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other)
    }
}
