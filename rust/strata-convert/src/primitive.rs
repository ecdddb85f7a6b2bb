//! Leaf converters: turn one primitive event into one logical value.

use std::sync::Arc;

use log::debug;
use strata_common::{Result, error::Error};
use strata_format::schema::{PrimitiveKind, PrimitiveType};
use strata_model::{
    Schema, Value,
    factory::{EnumClass, FixedConstructor},
    schema::{EnumSchema, FixedSchema},
};

use crate::{converter::BindContext, event::PrimitiveValue, legacy_timestamp, sink::ValueSink};

/// Converter for a primitive physical field.
pub struct PrimitiveConverter {
    kind: LeafKind,
}

enum LeafKind {
    /// Accepts and discards every event.
    NoOp,
    Boolean,
    Int,
    /// Accepts `int` and `long` events.
    Long,
    /// Accepts `int`, `long` and `float` events.
    Float,
    /// Accepts `int`, `long`, `float` and `double` events.
    Double,
    Bytes,
    String,
    Enum {
        schema: Arc<EnumSchema>,
        class: Option<Arc<dyn EnumClass>>,
    },
    Fixed {
        schema: Arc<FixedSchema>,
        constructor: Option<FixedConstructor>,
    },
    /// 12-byte legacy timestamp materialized as microseconds since the epoch.
    LegacyTimestampMicros,
}

impl PrimitiveConverter {
    /// Creates a converter that ignores every event it receives.
    pub fn no_op() -> PrimitiveConverter {
        PrimitiveConverter { kind: LeafKind::NoOp }
    }

    /// Creates a string converter, as used for map keys.
    pub fn string() -> PrimitiveConverter {
        PrimitiveConverter {
            kind: LeafKind::String,
        }
    }

    /// Binds a leaf converter for the logical `schema` over the primitive
    /// physical field.
    ///
    /// # Errors
    ///
    /// Returns an `UnsupportedConversion` error if the physical kind cannot
    /// hold values of the logical type, and a `MissingConstructor` error if a
    /// fixed class has no byte-array constructor.
    pub fn new(
        schema: &Schema,
        physical: &PrimitiveType,
        ctx: &BindContext,
    ) -> Result<PrimitiveConverter> {
        let physical_kind = physical.kind();
        if physical_kind == PrimitiveKind::Int96 {
            return Self::new_legacy_timestamp(schema, physical);
        }

        let kind = match schema {
            Schema::Boolean => LeafKind::Boolean,
            Schema::Int => LeafKind::Int,
            Schema::Long => LeafKind::Long,
            Schema::Float => LeafKind::Float,
            Schema::Double => LeafKind::Double,
            Schema::Bytes => LeafKind::Bytes,
            Schema::String => LeafKind::String,
            Schema::Enum(enum_schema) => LeafKind::Enum {
                schema: enum_schema.clone(),
                class: ctx.factory().enum_class(enum_schema),
            },
            Schema::Fixed(fixed_schema) => {
                let constructor = match ctx.factory().fixed_class(fixed_schema) {
                    Some(class) => Some(
                        class
                            .byte_array_constructor()
                            .ok_or_else(|| Error::missing_constructor(class.name()))?,
                    ),
                    None => None,
                };
                LeafKind::Fixed {
                    schema: fixed_schema.clone(),
                    constructor,
                }
            }
            _ => return Err(unsupported(schema, physical)),
        };

        if !accepts_physical(&kind, physical_kind) {
            return Err(unsupported(schema, physical));
        }
        Ok(PrimitiveConverter { kind })
    }

    fn new_legacy_timestamp(schema: &Schema, physical: &PrimitiveType) -> Result<PrimitiveConverter> {
        let kind = match schema {
            Schema::Bytes => LeafKind::Bytes,
            Schema::Long => LeafKind::LegacyTimestampMicros,
            _ => {
                return Err(Error::unsupported_conversion(
                    schema.to_string(),
                    format!("{physical}; INT96 can only be read as bytes or long"),
                ));
            }
        };
        Ok(PrimitiveConverter { kind })
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self.kind, LeafKind::NoOp)
    }

    /// Converts one event and delivers the result to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidOperation` error for an event this converter does not
    /// accept, an `InvalidFormat` error for undecodable data, and any error
    /// raised by the sink.
    pub fn add(&mut self, event: PrimitiveValue<'_>, sink: &mut dyn ValueSink) -> Result<()> {
        let value = match (&self.kind, event) {
            (LeafKind::NoOp, _) => return Ok(()),
            (LeafKind::Boolean, PrimitiveValue::Boolean(v)) => Value::Boolean(v),
            (LeafKind::Int, PrimitiveValue::Int(v)) => Value::Int(v),
            (LeafKind::Long, PrimitiveValue::Int(v)) => Value::Long(v as i64),
            (LeafKind::Long, PrimitiveValue::Long(v)) => Value::Long(v),
            (LeafKind::Float, PrimitiveValue::Int(v)) => Value::Float(v as f32),
            (LeafKind::Float, PrimitiveValue::Long(v)) => Value::Float(v as f32),
            (LeafKind::Float, PrimitiveValue::Float(v)) => Value::Float(v),
            (LeafKind::Double, PrimitiveValue::Int(v)) => Value::Double(v as f64),
            (LeafKind::Double, PrimitiveValue::Long(v)) => Value::Double(v as f64),
            (LeafKind::Double, PrimitiveValue::Float(v)) => Value::Double(v as f64),
            (LeafKind::Double, PrimitiveValue::Double(v)) => Value::Double(v),
            (LeafKind::Bytes, PrimitiveValue::Binary(b)) => Value::Bytes(b.to_vec()),
            (LeafKind::String, PrimitiveValue::Binary(b)) => {
                Value::String(String::from_utf8_lossy(b).into_owned())
            }
            (LeafKind::Enum { schema, class }, PrimitiveValue::Binary(b)) => {
                let symbol = String::from_utf8_lossy(b);
                match class {
                    Some(class) => class.constant(&symbol).ok_or_else(|| {
                        Error::invalid_data(
                            schema.name(),
                            format!("class {} has no constant '{symbol}'", class.name()),
                        )
                    })?,
                    None => Value::Enum(symbol.into_owned()),
                }
            }
            (LeafKind::Fixed { schema, constructor }, PrimitiveValue::Binary(b)) => {
                if b.len() != schema.size() {
                    debug!(
                        "fixed {} declares {} bytes, received {}",
                        schema.name(),
                        schema.size(),
                        b.len()
                    );
                }
                match constructor {
                    Some(constructor) => constructor(b.to_vec()),
                    None => Value::Fixed(b.to_vec()),
                }
            }
            (LeafKind::LegacyTimestampMicros, PrimitiveValue::Binary(b)) => {
                Value::Long(legacy_timestamp::decode_micros(b)?)
            }
            (kind, event) => {
                return Err(Error::invalid_operation(format!(
                    "{} event delivered to a {} converter",
                    event.event_name(),
                    kind.name()
                )));
            }
        };
        sink.add(value)
    }
}

impl LeafKind {
    fn name(&self) -> &'static str {
        match self {
            LeafKind::NoOp => "no-op",
            LeafKind::Boolean => "boolean",
            LeafKind::Int => "int",
            LeafKind::Long => "long",
            LeafKind::Float => "float",
            LeafKind::Double => "double",
            LeafKind::Bytes => "bytes",
            LeafKind::String => "string",
            LeafKind::Enum { .. } => "enum",
            LeafKind::Fixed { .. } => "fixed",
            LeafKind::LegacyTimestampMicros => "legacy timestamp",
        }
    }
}

fn accepts_physical(kind: &LeafKind, physical: PrimitiveKind) -> bool {
    use PrimitiveKind as P;
    match kind {
        LeafKind::NoOp => true,
        LeafKind::Boolean => physical == P::Boolean,
        LeafKind::Int => physical == P::Int32,
        LeafKind::Long => matches!(physical, P::Int32 | P::Int64),
        LeafKind::Float => matches!(physical, P::Int32 | P::Int64 | P::Float),
        LeafKind::Double => matches!(physical, P::Int32 | P::Int64 | P::Float | P::Double),
        LeafKind::Bytes
        | LeafKind::String
        | LeafKind::Enum { .. }
        | LeafKind::Fixed { .. } => physical.is_binary(),
        LeafKind::LegacyTimestampMicros => physical == P::Int96,
    }
}

fn unsupported(schema: &Schema, physical: &PrimitiveType) -> Error {
    Error::unsupported_conversion(schema.to_string(), physical.to_string())
}
