//! Record shredding: the writer-side inverse of materialization.
//!
//! [`shred`] walks a logical record and emits the decode events a columnar
//! reader would produce for it under the physical layout derived by
//! [`SchemaConverter`](strata_convert::SchemaConverter) with the same list
//! layout setting.

use anyhow::{Context, bail};
use strata_model::{Schema, Value, schema::RecordSchema};

use crate::events::{Event, EventScript};

/// Emits the events for one record.
///
/// `null` values are absent optional fields; list elements that are `null`
/// are empty element wrappers.
pub fn shred(record: &Value, schema: &RecordSchema, legacy_lists: bool) -> anyhow::Result<EventScript> {
    let mut shredder = Shredder {
        script: EventScript::new(),
        legacy_lists,
    };
    shredder.script.push(Event::StartRecord);
    shredder.fields(record, schema)?;
    shredder.script.push(Event::EndRecord);
    Ok(shredder.script)
}

/// Emits the events for a sequence of records.
pub fn shred_all<'a>(
    records: impl IntoIterator<Item = &'a Value>,
    schema: &RecordSchema,
    legacy_lists: bool,
) -> anyhow::Result<EventScript> {
    let mut script = EventScript::new();
    for record in records {
        script.extend(shred(record, schema, legacy_lists)?);
    }
    Ok(script)
}

struct Shredder {
    script: EventScript,
    legacy_lists: bool,
}

impl Shredder {
    fn fields(&mut self, record: &Value, schema: &RecordSchema) -> anyhow::Result<()> {
        let record = record
            .as_record()
            .with_context(|| format!("expected a record {}, found {record:?}", schema.name()))?;
        for (index, field) in schema.fields().iter().enumerate() {
            let value = record.get_at(field.pos()).unwrap_or(&Value::Null);
            self.field(index, field.schema(), value)
                .with_context(|| format!("field '{}'", field.name()))?;
        }
        Ok(())
    }

    fn field(&mut self, index: usize, schema: &Schema, value: &Value) -> anyhow::Result<()> {
        if value.is_null() {
            return Ok(());
        }
        match (schema, value) {
            (Schema::Union(members), _) => {
                let inner = schema.non_null();
                if !std::ptr::eq(inner, schema) {
                    return self.field(index, inner, value);
                }
                let (member_index, member) = members
                    .iter()
                    .filter(|m| !matches!(m, Schema::Null))
                    .enumerate()
                    .find(|(_, m)| matches_kind(m, value))
                    .with_context(|| format!("no member of {schema} holds {value:?}"))?;
                self.script.push(Event::StartGroup { index });
                self.field(member_index, member, value)?;
                self.script.push(Event::EndGroup);
            }
            (Schema::Boolean, Value::Boolean(v)) => self.push(Event::Boolean { index, value: *v }),
            (Schema::Int, Value::Int(v)) => self.push(Event::Int { index, value: *v }),
            (Schema::Long, Value::Long(v)) => self.push(Event::Long { index, value: *v }),
            (Schema::Float, Value::Float(v)) => self.push(Event::Float { index, value: *v }),
            (Schema::Double, Value::Double(v)) => self.push(Event::Double { index, value: *v }),
            (Schema::Bytes, Value::Bytes(v)) | (Schema::Fixed(_), Value::Fixed(v)) => {
                self.push(Event::Binary {
                    index,
                    value: v.clone(),
                })
            }
            (Schema::String, Value::String(v)) | (Schema::Enum(_), Value::Enum(v)) => {
                self.push(Event::Text {
                    index,
                    value: v.clone(),
                })
            }
            (Schema::Record(record), _) => {
                self.script.push(Event::StartGroup { index });
                self.fields(value, record)?;
                self.script.push(Event::EndGroup);
            }
            (Schema::Array(element), Value::Array(items)) => {
                self.script.push(Event::StartGroup { index });
                for item in items {
                    if self.legacy_lists {
                        self.field(0, element, item)?;
                    } else {
                        self.script.push(Event::StartGroup { index: 0 });
                        self.field(0, element, item)?;
                        self.script.push(Event::EndGroup);
                    }
                }
                self.script.push(Event::EndGroup);
            }
            (Schema::Map(value_schema), Value::Map(entries)) => {
                self.script.push(Event::StartGroup { index });
                for (key, item) in entries {
                    self.script.push(Event::StartGroup { index: 0 });
                    self.push(Event::Text {
                        index: 0,
                        value: key.clone(),
                    });
                    self.field(1, value_schema, item)?;
                    self.script.push(Event::EndGroup);
                }
                self.script.push(Event::EndGroup);
            }
            _ => bail!("cannot shred {value:?} as {schema}"),
        }
        Ok(())
    }

    fn push(&mut self, event: Event) {
        self.script.push(event);
    }
}

fn matches_kind(schema: &Schema, value: &Value) -> bool {
    matches!(
        (schema, value),
        (Schema::Boolean, Value::Boolean(_))
            | (Schema::Int, Value::Int(_))
            | (Schema::Long, Value::Long(_))
            | (Schema::Float, Value::Float(_))
            | (Schema::Double, Value::Double(_))
            | (Schema::Bytes, Value::Bytes(_))
            | (Schema::String, Value::String(_))
            | (Schema::Enum(_), Value::Enum(_))
            | (Schema::Fixed(_), Value::Fixed(_))
            | (Schema::Array(_), Value::Array(_))
            | (Schema::Map(_), Value::Map(_))
    ) || matches!(
        (schema, value),
        (Schema::Record(s), Value::Record(r)) if s.name() == r.schema().name()
    )
}
