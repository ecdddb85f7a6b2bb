use std::{fmt, sync::Arc};

use strata_common::{Result, error::Error};

use crate::{schema::RecordSchema, value::Value};

/// A record under construction, addressed by field position.
///
/// Dynamic records ([`GenericRecord`]) and statically-typed classes produced by
/// an [`ObjectFactory`](crate::factory::ObjectFactory) both implement this trait,
/// which is all a converter needs to assemble one field at a time.
pub trait IndexedRecord: fmt::Debug + Send {
    /// The logical schema of the record.
    fn schema(&self) -> &Arc<RecordSchema>;

    /// Stores the value of the field at `pos`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pos` is not a field of the record or if the value
    /// does not fit the field.
    fn put(&mut self, pos: usize, value: Value) -> Result<()>;

    /// Converts the completed record into a value, transferring ownership.
    fn into_value(self: Box<Self>) -> Value;
}

/// A fully dynamic record: one value slot per logical field.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    schema: Arc<RecordSchema>,
    values: Vec<Value>,
}

impl GenericRecord {
    /// Creates a record with every field set to `null`.
    pub fn new(schema: Arc<RecordSchema>) -> GenericRecord {
        let values = vec![Value::Null; schema.len()];
        GenericRecord { schema, values }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the value of the named field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .field(name)
            .and_then(|field| self.values.get(field.pos()))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let pos = self.schema.field(name)?.pos();
        self.values.get_mut(pos)
    }

    pub fn get_at(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    /// Stores the value of the named field.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no such field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let pos = self
            .schema
            .field(name)
            .ok_or_else(|| {
                Error::invalid_arg(
                    "name",
                    format!("record {} has no field '{name}'", self.schema.name()),
                )
            })?
            .pos();
        self.values[pos] = value.into();
        Ok(())
    }
}

impl IndexedRecord for GenericRecord {
    fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    fn put(&mut self, pos: usize, value: Value) -> Result<()> {
        let field_count = self.values.len();
        let slot = self.values.get_mut(pos).ok_or_else(|| {
            Error::invalid_arg(
                "pos",
                format!(
                    "record {} has {field_count} fields, position {pos} is out of range",
                    self.schema.name()
                ),
            )
        })?;
        *slot = value;
        Ok(())
    }

    fn into_value(self: Box<Self>) -> Value {
        Value::Record(*self)
    }
}
