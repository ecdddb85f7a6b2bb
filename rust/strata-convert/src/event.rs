//! Primitive event payloads.

use std::fmt;

/// The payload of a primitive decode event, as produced by the columnar
/// reader for a leaf column.
///
/// Binary payloads are borrowed from the reader's buffers and copied only by
/// the converters that keep them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue<'a> {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Binary(&'a [u8]),
}

impl PrimitiveValue<'_> {
    /// The name of the event, as used in error messages.
    pub fn event_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Boolean(_) => "boolean",
            PrimitiveValue::Int(_) => "int",
            PrimitiveValue::Long(_) => "long",
            PrimitiveValue::Float(_) => "float",
            PrimitiveValue::Double(_) => "double",
            PrimitiveValue::Binary(_) => "binary",
        }
    }
}

impl fmt::Display for PrimitiveValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Boolean(v) => write!(f, "{v}"),
            PrimitiveValue::Int(v) => write!(f, "{v}"),
            PrimitiveValue::Long(v) => write!(f, "{v}"),
            PrimitiveValue::Float(v) => write!(f, "{v}"),
            PrimitiveValue::Double(v) => write!(f, "{v}"),
            PrimitiveValue::Binary(v) => write!(f, "binary({} bytes)", v.len()),
        }
    }
}
