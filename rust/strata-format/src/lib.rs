//! Physical schema definitions: the nested group/primitive layout of records as
//! they are laid out in columnar storage, and builders for composing them.

pub mod schema;
pub mod schema_builder;
