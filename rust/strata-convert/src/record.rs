//! Record converter: pairs physical fields with logical fields by name or
//! alias and fills unwritten fields from their declared defaults.

use std::sync::Arc;

use log::debug;
use strata_common::{Result, error::Error, result::verify_field_index};
use strata_format::schema::GroupType;
use strata_model::{
    GenericRecord, IndexedRecord, Schema, SchemaKind, Value,
    defaults::{deep_copy, resolve_default},
    factory::RecordClass,
    schema::{Field, RecordSchema},
};

use crate::{
    converter::{BindContext, Converter},
    event::PrimitiveValue,
    sink::{DiscardSink, RecordFieldSink, ValueSink},
};

/// Converter for a physical group materialized as a record.
pub struct RecordConverter {
    schema: Arc<RecordSchema>,
    class: Option<Arc<dyn RecordClass>>,
    /// One converter per physical field, in physical order.
    fields: Vec<FieldConverter>,
    /// Defaults for the logical fields no physical field maps to.
    defaults: Vec<DefaultValue>,
    current: Option<Box<dyn IndexedRecord>>,
}

struct FieldConverter {
    converter: Converter,
    /// Position of the logical field written by this converter, `None` for
    /// ignored physical fields.
    pos: Option<usize>,
}

struct DefaultValue {
    pos: usize,
    schema: Schema,
    value: Value,
}

impl RecordConverter {
    /// Binds a record converter.
    ///
    /// Each physical field is matched to the logical field with the same name;
    /// failing that, to the first logical field listing the name as an alias.
    /// Physical fields without a match are read and discarded.
    ///
    /// # Arguments
    ///
    /// * `physical` - The physical group holding the record's fields.
    /// * `schema` - The logical record schema.
    /// * `ctx` - The object factory and options to bind with.
    ///
    /// # Errors
    ///
    /// Returns an error if a matched field cannot be bound, if two physical
    /// fields match the same logical field, or if the default of an unmatched
    /// logical field is invalid.
    pub fn new(
        physical: &GroupType,
        schema: &Arc<RecordSchema>,
        ctx: &BindContext,
    ) -> Result<RecordConverter> {
        let mut consumed = vec![false; schema.len()];
        let mut fields = Vec::with_capacity(physical.field_count());

        for field_type in physical.fields() {
            let Some(field) = resolve_field(schema, field_type.name()) else {
                debug!(
                    "record {}: ignoring physical field '{}' with no logical counterpart",
                    schema.name(),
                    field_type.name()
                );
                fields.push(FieldConverter {
                    converter: Converter::no_op(field_type),
                    pos: None,
                });
                continue;
            };

            if field.name() != field_type.name() {
                debug!(
                    "record {}: physical field '{}' resolved as alias of '{}'",
                    schema.name(),
                    field_type.name(),
                    field.name()
                );
            }
            if std::mem::replace(&mut consumed[field.pos()], true) {
                return Err(Error::invalid_arg(
                    "physical",
                    format!(
                        "field '{}' of record {} is matched by more than one physical field",
                        field.name(),
                        schema.name()
                    ),
                ));
            }
            fields.push(FieldConverter {
                converter: Converter::new(field.schema(), field_type, ctx)?,
                pos: Some(field.pos()),
            });
        }

        let mut defaults = Vec::new();
        for field in schema.fields() {
            if consumed[field.pos()] || field.schema().kind() == SchemaKind::Null {
                continue;
            }
            if let Some(value) = resolve_default(field, ctx.factory())? {
                debug!(
                    "record {}: field '{}' is absent from the data, using its default",
                    schema.name(),
                    field.name()
                );
                defaults.push(DefaultValue {
                    pos: field.pos(),
                    schema: field.schema().clone(),
                    value,
                });
            }
        }

        Ok(RecordConverter {
            schema: schema.clone(),
            class: ctx.factory().record_class(schema),
            fields,
            defaults,
            current: None,
        })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Number of physical fields, including ignored ones.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn start(&mut self) -> Result<()> {
        let record = match &self.class {
            Some(class) => class.new_instance(&self.schema),
            None => Box::new(GenericRecord::new(self.schema.clone())),
        };
        self.current = Some(record);
        Ok(())
    }

    /// Fills in defaults and hands the completed record to `sink`.
    pub fn end(&mut self, sink: &mut dyn ValueSink) -> Result<()> {
        let mut record = self.current.take().ok_or_else(|| self.not_started())?;
        for default in &self.defaults {
            record.put(default.pos, deep_copy(&default.schema, &default.value))?;
        }
        sink.add(record.into_value())
    }

    pub(crate) fn child(&mut self, index: usize) -> Result<&mut Converter> {
        verify_field_index(index, self.fields.len())?;
        Ok(&mut self.fields[index].converter)
    }

    pub(crate) fn end_child(&mut self, index: usize) -> Result<()> {
        self.with_field_sink(index, |converter, sink| converter.as_group_mut()?.end(sink))
    }

    pub(crate) fn add_to_child(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        self.with_field_sink(index, |converter, sink| {
            converter.as_primitive_mut()?.add(event, sink)
        })
    }

    fn with_field_sink<F>(&mut self, index: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut Converter, &mut dyn ValueSink) -> Result<()>,
    {
        verify_field_index(index, self.fields.len())?;
        let field = &mut self.fields[index];
        match field.pos {
            None => f(&mut field.converter, &mut DiscardSink),
            Some(pos) => match self.current.as_deref_mut() {
                Some(record) => f(&mut field.converter, &mut RecordFieldSink { record, pos }),
                None => Err(Error::invalid_operation(format!(
                    "record {} has not been started",
                    self.schema.name()
                ))),
            },
        }
    }

    fn not_started(&self) -> Error {
        Error::invalid_operation(format!(
            "record {} has not been started",
            self.schema.name()
        ))
    }
}

/// Finds the logical field a physical field name maps to: exact name first,
/// then the first field declaring the name as an alias.
fn resolve_field<'s>(schema: &'s RecordSchema, name: &str) -> Option<&'s Field> {
    schema
        .field(name)
        .or_else(|| schema.fields().iter().find(|field| field.has_alias(name)))
}
