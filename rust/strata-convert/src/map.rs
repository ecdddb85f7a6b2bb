//! Map converters.
//!
//! A map is a physical group with one repeated key/value group; each
//! occurrence of that group is one entry, with the key as its first field and
//! the value as its second. Keys are strings. A repeated key keeps the value
//! of its last occurrence.

use ahash::AHashMap;
use log::warn;
use strata_common::{Result, error::Error, result::verify_field_index};
use strata_format::schema::{GroupType, Type};
use strata_model::{Schema, Value};

use crate::{
    converter::{BindContext, Converter, GroupConverter},
    event::PrimitiveValue,
    options::MapEntryPolicy,
    primitive::PrimitiveConverter,
    sink::{SlotSink, ValueSink},
};

/// Converter for a physical map group.
pub struct MapConverter {
    /// Always [`GroupConverter::MapEntry`].
    entry: Box<GroupConverter>,
    current: Option<AHashMap<String, Value>>,
}

impl MapConverter {
    /// Binds a map converter for the logical map `schema`.
    ///
    /// # Errors
    ///
    /// Returns an `UnsupportedConversion` error if `schema` is not a map, if
    /// the physical group is not a single repeated key/value group, or if the
    /// key is not a binary field.
    pub fn new(physical: &GroupType, schema: &Schema, ctx: &BindContext) -> Result<MapConverter> {
        let Schema::Map(value_schema) = schema else {
            return Err(unsupported(schema, physical));
        };
        if physical.field_count() != 1 {
            return Err(unsupported(schema, physical));
        }
        let Type::Group(key_value) = physical.field(0)? else {
            return Err(unsupported(schema, physical));
        };
        let entry = KeyValueConverter::new(key_value, value_schema, physical.name(), ctx)?;
        Ok(MapConverter {
            entry: Box::new(GroupConverter::MapEntry(entry)),
            current: None,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        self.current = Some(AHashMap::new());
        Ok(())
    }

    pub fn end(&mut self, sink: &mut dyn ValueSink) -> Result<()> {
        let map = self.current.take().ok_or_else(not_started)?;
        sink.add(Value::Map(map))
    }

    pub(crate) fn entry(&mut self, index: usize) -> Result<&mut GroupConverter> {
        verify_field_index(index, 1)?;
        Ok(&mut *self.entry)
    }

    pub(crate) fn end_entry(&mut self, index: usize) -> Result<()> {
        verify_field_index(index, 1)?;
        let map = self.current.as_mut().ok_or_else(not_started)?;
        self.entry.end_map_entry(map)
    }

    pub(crate) fn add_to_entry(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        verify_field_index(index, 1)?;
        Err(Error::invalid_operation(format!(
            "{} event delivered to a map entry group",
            event.event_name()
        )))
    }
}

/// Converter for one key/value entry of a map.
pub struct KeyValueConverter {
    map_name: String,
    key: Box<Converter>,
    value: Box<Converter>,
    key_slot: Option<Value>,
    value_slot: Option<Value>,
    value_nullable: bool,
    policy: MapEntryPolicy,
}

impl KeyValueConverter {
    /// Binds the key/value group of a map.
    ///
    /// # Arguments
    ///
    /// * `physical` - The repeated key/value group.
    /// * `value_schema` - The logical schema of map values.
    /// * `map_name` - Name of the enclosing map, for diagnostics.
    /// * `ctx` - The object factory and options to bind with.
    pub fn new(
        physical: &GroupType,
        value_schema: &Schema,
        map_name: &str,
        ctx: &BindContext,
    ) -> Result<KeyValueConverter> {
        if physical.field_count() != 2 {
            return Err(Error::unsupported_conversion(
                Schema::map(value_schema.clone()).to_string(),
                physical.to_string(),
            ));
        }
        let key = match physical.field(0)? {
            Type::Primitive(key) => PrimitiveConverter::new(&Schema::String, key, ctx)?,
            key @ Type::Group(_) => {
                return Err(Error::unsupported_conversion(
                    Schema::String.to_string(),
                    key.to_string(),
                ));
            }
        };
        let value_nullable = match value_schema {
            Schema::Union(members) => members.iter().any(|m| matches!(m, Schema::Null)),
            _ => false,
        };

        Ok(KeyValueConverter {
            map_name: map_name.to_string(),
            key: Box::new(key.into()),
            value: Box::new(Converter::new(value_schema, physical.field(1)?, ctx)?),
            key_slot: None,
            value_slot: None,
            value_nullable,
            policy: ctx.options().map_entries(),
        })
    }

    pub fn start(&mut self) -> Result<()> {
        self.key_slot = None;
        self.value_slot = None;
        Ok(())
    }

    /// Stores the completed entry into `map`, replacing any previous value of
    /// the same key.
    ///
    /// # Errors
    ///
    /// Under [`MapEntryPolicy::Strict`], returns an `InvalidFormat` error for
    /// an entry without a key, or without a value when the value type is not
    /// nullable.
    pub fn end_into(&mut self, map: &mut AHashMap<String, Value>) -> Result<()> {
        let value = self.value_slot.take();
        let key = match self.key_slot.take() {
            Some(Value::String(key)) => key,
            Some(other) => {
                return Err(Error::invalid_data(
                    &self.map_name,
                    format!("map key must be a string, found {other:?}"),
                ));
            }
            None if self.policy == MapEntryPolicy::Strict => {
                return Err(Error::invalid_data(&self.map_name, "map entry has no key"));
            }
            None => {
                warn!("map '{}': dropping an entry with no key", self.map_name);
                return Ok(());
            }
        };
        let value = match value {
            Some(value) => value,
            None if self.policy == MapEntryPolicy::Strict && !self.value_nullable => {
                return Err(Error::invalid_data(
                    &self.map_name,
                    format!("map entry '{key}' has no value"),
                ));
            }
            None => Value::Null,
        };
        map.insert(key, value);
        Ok(())
    }

    pub(crate) fn child(&mut self, index: usize) -> Result<&mut Converter> {
        Ok(self.slot(index)?.0)
    }

    pub(crate) fn end_child(&mut self, index: usize) -> Result<()> {
        let (converter, slot) = self.slot(index)?;
        converter.as_group_mut()?.end(&mut SlotSink { slot })
    }

    pub(crate) fn add_to_child(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        let (converter, slot) = self.slot(index)?;
        converter.as_primitive_mut()?.add(event, &mut SlotSink { slot })
    }

    fn slot(&mut self, index: usize) -> Result<(&mut Converter, &mut Option<Value>)> {
        verify_field_index(index, 2)?;
        if index == 0 {
            Ok((&mut *self.key, &mut self.key_slot))
        } else {
            Ok((&mut *self.value, &mut self.value_slot))
        }
    }
}

fn unsupported(schema: &Schema, physical: &GroupType) -> Error {
    Error::unsupported_conversion(schema.to_string(), physical.to_string())
}

fn not_started() -> Error {
    Error::invalid_operation("map has not been started")
}

#[cfg(test)]
mod tests {
    use strata_common::error::ErrorKind;
    use strata_format::{
        schema::{PrimitiveKind, Repetition},
        schema_builder::{map, optional, required},
    };
    use strata_model::GenericFactory;

    use super::*;
    use crate::options::ConverterOptions;

    fn bind(value: Type, schema: &Schema, options: ConverterOptions) -> GroupConverter {
        let physical = map(Repetition::Required, "attrs", value);
        let ctx = BindContext::new(&GenericFactory, &options);
        GroupConverter::Map(MapConverter::new(physical.as_group().unwrap(), schema, &ctx).unwrap())
    }

    fn entry(map: &mut GroupConverter, key: Option<&str>, value: Option<i64>) -> Result<()> {
        map.child_group(0)?.start()?;
        if let Some(key) = key {
            map.child_group(0)?
                .add_to_child(0, PrimitiveValue::Binary(key.as_bytes()))?;
        }
        if let Some(value) = value {
            map.child_group(0)?.add_to_child(1, PrimitiveValue::Long(value))?;
        }
        map.end_child(0)
    }

    fn finish(map: &mut GroupConverter) -> AHashMap<String, Value> {
        let mut out = None;
        map.end(&mut |value: Value| -> Result<()> {
            out = Some(value);
            Ok(())
        })
        .unwrap();
        match out {
            Some(Value::Map(map)) => map,
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut converter = bind(
            required(PrimitiveKind::Int64, "value"),
            &Schema::map(Schema::Long),
            ConverterOptions::default(),
        );
        converter.start().unwrap();
        entry(&mut converter, Some("a"), Some(1)).unwrap();
        entry(&mut converter, Some("b"), Some(2)).unwrap();
        entry(&mut converter, Some("a"), Some(3)).unwrap();
        let map = finish(&mut converter);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], Value::Long(3));
        assert_eq!(map["b"], Value::Long(2));
    }

    #[test]
    fn test_lenient_incomplete_entries() {
        let mut converter = bind(
            required(PrimitiveKind::Int64, "value"),
            &Schema::map(Schema::Long),
            ConverterOptions::default(),
        );
        converter.start().unwrap();
        entry(&mut converter, Some("k"), None).unwrap();
        entry(&mut converter, None, Some(5)).unwrap();
        let map = finish(&mut converter);
        assert_eq!(map.len(), 1);
        assert_eq!(map["k"], Value::Null);
    }

    #[test]
    fn test_strict_incomplete_entries() {
        let options = ConverterOptions::new().with_map_entries(MapEntryPolicy::Strict);
        let mut converter = bind(
            required(PrimitiveKind::Int64, "value"),
            &Schema::map(Schema::Long),
            options.clone(),
        );
        converter.start().unwrap();
        let err = entry(&mut converter, Some("k"), None).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
        assert!(entry(&mut converter, None, Some(1)).is_err());

        // A nullable value type legitimately carries absent values.
        let mut converter = bind(
            optional(PrimitiveKind::Int64, "value"),
            &Schema::map(Schema::nullable(Schema::Long)),
            options,
        );
        converter.start().unwrap();
        entry(&mut converter, Some("k"), None).unwrap();
        assert_eq!(finish(&mut converter)["k"], Value::Null);
    }

    #[test]
    fn test_non_binary_key_fails_bind() {
        let key_value = strata_format::schema_builder::group(
            Repetition::Repeated,
            "key_value",
            vec![
                required(PrimitiveKind::Int32, "key"),
                required(PrimitiveKind::Int64, "value"),
            ],
        );
        let physical =
            strata_format::schema_builder::group(Repetition::Required, "attrs", vec![key_value]);
        let options = ConverterOptions::default();
        let ctx = BindContext::new(&GenericFactory, &options);
        let err = MapConverter::new(physical.as_group().unwrap(), &Schema::map(Schema::Long), &ctx)
            .err()
            .unwrap();
        assert!(err.is_bind_error());
    }
}
