//! Sample statically-typed classes and the schemas they represent.

use std::sync::Arc;

use serde_json::json;
use strata_common::{Result, error::Error};
use strata_model::{
    ClassRegistry, IndexedRecord, Schema, Value,
    factory::{EnumClass, FixedClass, FixedConstructor, RecordClass},
    schema::{EnumSchema, Field, FixedSchema, RecordSchema},
};

pub const COLOR: &str = "testkit.Color";
pub const POINT: &str = "testkit.Point";
pub const DIGEST: &str = "testkit.Digest";
pub const OPAQUE: &str = "testkit.Opaque";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
}

pub fn color_schema() -> Arc<EnumSchema> {
    EnumSchema::new(COLOR, ["RED", "GREEN", "BLUE"])
}

/// Enum class for [`Color`]. Deliberately has no constant for `BLUE` so that
/// schema/class drift can be exercised.
pub struct ColorClass;

impl EnumClass for ColorClass {
    fn name(&self) -> &str {
        COLOR
    }

    fn constant(&self, symbol: &str) -> Option<Value> {
        match symbol {
            "RED" => Some(Value::specific(Color::Red)),
            "GREEN" => Some(Value::specific(Color::Green)),
            _ => None,
        }
    }
}

/// A point with integer coordinates, materialized through [`PointClass`].
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    schema: Arc<RecordSchema>,
}

/// `record testkit.Point { x: int, y: int = 0 }`
pub fn point_schema() -> Arc<RecordSchema> {
    RecordSchema::new(
        POINT,
        vec![
            Field::new("x", Schema::Int),
            Field::new("y", Schema::Int).with_default(json!(0)),
        ],
    )
    .expect("valid point schema")
}

impl IndexedRecord for Point {
    fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    fn put(&mut self, pos: usize, value: Value) -> Result<()> {
        let coordinate = value
            .as_i32()
            .ok_or_else(|| Error::invalid_arg("value", format!("expected an int, found {value:?}")))?;
        match pos {
            0 => self.x = coordinate,
            1 => self.y = coordinate,
            _ => return Err(Error::invalid_arg("pos", format!("point has no field {pos}"))),
        }
        Ok(())
    }

    fn into_value(self: Box<Self>) -> Value {
        Value::specific(*self)
    }
}

pub struct PointClass;

impl RecordClass for PointClass {
    fn name(&self) -> &str {
        POINT
    }

    fn new_instance(&self, schema: &Arc<RecordSchema>) -> Box<dyn IndexedRecord> {
        Box::new(Point {
            x: 0,
            y: 0,
            schema: schema.clone(),
        })
    }
}

/// A fixed-size digest built from its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(pub Vec<u8>);

pub fn digest_schema() -> Arc<FixedSchema> {
    FixedSchema::new(DIGEST, 4)
}

pub struct DigestClass;

impl FixedClass for DigestClass {
    fn name(&self) -> &str {
        DIGEST
    }

    fn byte_array_constructor(&self) -> Option<FixedConstructor> {
        Some(Arc::new(|bytes| Value::specific(Digest(bytes))))
    }
}

/// A fixed class that cannot be constructed from bytes.
pub struct OpaqueClass;

pub fn opaque_schema() -> Arc<FixedSchema> {
    FixedSchema::new(OPAQUE, 2)
}

impl FixedClass for OpaqueClass {
    fn name(&self) -> &str {
        OPAQUE
    }

    fn byte_array_constructor(&self) -> Option<FixedConstructor> {
        None
    }
}

/// A registry holding [`ColorClass`], [`PointClass`] and [`DigestClass`].
pub fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register_enum(Arc::new(ColorClass))
        .register_record(Arc::new(PointClass))
        .register_fixed(Arc::new(DigestClass));
    registry
}

/// [`registry`] plus [`OpaqueClass`].
pub fn registry_with_opaque() -> ClassRegistry {
    let mut registry = registry();
    registry.register_fixed(Arc::new(OpaqueClass));
    registry
}
