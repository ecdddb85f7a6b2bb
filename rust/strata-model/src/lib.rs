//! The logical object model: schemas describing the shape consumers ask for,
//! the dynamic values that are materialized against them, and the factory
//! capability that decides between statically-typed and dynamic instances.

pub mod defaults;
pub mod factory;
pub mod record;
pub mod schema;
pub mod value;
#[cfg(test)]
mod tests;

pub use factory::{ClassRegistry, GenericFactory, ObjectFactory};
pub use record::{GenericRecord, IndexedRecord};
pub use schema::{EnumSchema, Field, FixedSchema, RecordSchema, Schema, SchemaKind};
pub use value::{SpecificValue, Value};
