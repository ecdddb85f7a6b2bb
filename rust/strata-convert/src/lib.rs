//! Strata Convert
//!
//! Materializes records read from a columnar layout into the dynamic logical
//! object model. A converter tree is bound once from a logical record schema
//! and the physical layout of the data; a [`RecordMaterializer`] then drives
//! it with the reader's decode events and yields one [`Value`] per record.
//!
//! [`Value`]: strata_model::Value

pub mod builder;
pub mod converter;
pub mod event;
pub mod legacy_timestamp;
pub mod list;
pub mod map;
pub mod materializer;
pub mod options;
pub mod primitive;
pub mod record;
pub mod schema_converter;
pub mod sink;
pub mod union;

pub use builder::MaterializerBuilder;
pub use converter::{BindContext, Converter, GroupConverter};
pub use event::PrimitiveValue;
pub use materializer::RecordMaterializer;
pub use options::{ConverterOptions, MapEntryPolicy};
pub use schema_converter::SchemaConverter;
pub use sink::ValueSink;
