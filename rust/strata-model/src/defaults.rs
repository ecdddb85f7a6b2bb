//! Resolution of declared field defaults into object-model values.
//!
//! Defaults are declared in their JSON form and interpreted against the field's
//! schema:
//!
//! - a union default is interpreted against the first member of the union;
//! - `bytes` and `fixed` defaults are strings whose characters are code points
//!   in `0..=255`, one byte each;
//! - enum defaults are symbols;
//! - record defaults are objects; a field missing from the object falls back to
//!   the field's own declared default.
//!
//! Named types resolve through the object factory, so a default for a field of
//! a statically-known class is an instance of that class.

use strata_common::{Result, error::Error};

use crate::{
    factory::ObjectFactory,
    record::{GenericRecord, IndexedRecord},
    schema::{Field, Schema},
    value::Value,
};

/// Resolves the declared default of a field.
///
/// Returns `Ok(None)` if the field declares no default or if the default
/// resolves to `null`.
///
/// # Errors
///
/// Returns an `InvalidDefault` error if the declared default does not fit the
/// field's schema.
pub fn resolve_default(field: &Field, factory: &dyn ObjectFactory) -> Result<Option<Value>> {
    let Some(json) = field.default_value() else {
        return Ok(None);
    };
    let value = json_to_value(field.schema(), json, factory)
        .map_err(|message| Error::invalid_default(field.name(), message))?;
    Ok((!value.is_null()).then_some(value))
}

/// Copies a resolved default for storage in a new record.
///
/// Scalars are copied by value; every other kind gets a deep copy, so records
/// never share nested default state.
pub fn deep_copy(schema: &Schema, value: &Value) -> Value {
    if schema.kind().is_scalar() {
        match value {
            Value::Boolean(v) => return Value::Boolean(*v),
            Value::Int(v) => return Value::Int(*v),
            Value::Long(v) => return Value::Long(*v),
            Value::Float(v) => return Value::Float(*v),
            Value::Double(v) => return Value::Double(*v),
            _ => (),
        }
    }
    value.clone()
}

fn json_to_value(
    schema: &Schema,
    json: &serde_json::Value,
    factory: &dyn ObjectFactory,
) -> std::result::Result<Value, String> {
    let mismatch = || format!("expected {schema}, found {json}");
    match schema {
        Schema::Null => json.is_null().then_some(Value::Null).ok_or_else(mismatch),
        Schema::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(mismatch),
        Schema::Int => json
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int)
            .ok_or_else(mismatch),
        Schema::Long => json.as_i64().map(Value::Long).ok_or_else(mismatch),
        Schema::Float => json
            .as_f64()
            .map(|v| Value::Float(v as f32))
            .ok_or_else(mismatch),
        Schema::Double => json.as_f64().map(Value::Double).ok_or_else(mismatch),
        Schema::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(mismatch),
        Schema::Bytes => {
            let text = json.as_str().ok_or_else(mismatch)?;
            Ok(Value::Bytes(latin1_bytes(text)?))
        }
        Schema::Fixed(fixed) => {
            let bytes = latin1_bytes(json.as_str().ok_or_else(mismatch)?)?;
            if bytes.len() != fixed.size() {
                return Err(format!(
                    "fixed {} expects {} bytes, default has {}",
                    fixed.name(),
                    fixed.size(),
                    bytes.len()
                ));
            }
            match factory.fixed_class(fixed) {
                Some(class) => {
                    let ctor = class
                        .byte_array_constructor()
                        .ok_or_else(|| format!("class {} has no byte array constructor", class.name()))?;
                    Ok(ctor(bytes))
                }
                None => Ok(Value::Fixed(bytes)),
            }
        }
        Schema::Enum(enum_schema) => {
            let symbol = json.as_str().ok_or_else(mismatch)?;
            if !enum_schema.has_symbol(symbol) {
                return Err(format!(
                    "'{symbol}' is not a symbol of enum {}",
                    enum_schema.name()
                ));
            }
            match factory.enum_class(enum_schema) {
                Some(class) => class
                    .constant(symbol)
                    .ok_or_else(|| format!("class {} has no constant '{symbol}'", class.name())),
                None => Ok(Value::Enum(symbol.to_string())),
            }
        }
        Schema::Array(element) => json
            .as_array()
            .ok_or_else(mismatch)?
            .iter()
            .map(|item| json_to_value(element, item, factory))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        Schema::Map(value_schema) => json
            .as_object()
            .ok_or_else(mismatch)?
            .iter()
            .map(|(key, item)| {
                json_to_value(value_schema, item, factory).map(|value| (key.clone(), value))
            })
            .collect::<std::result::Result<_, String>>()
            .map(Value::Map),
        Schema::Record(record_schema) => {
            let object = json.as_object().ok_or_else(mismatch)?;
            let mut record: Box<dyn IndexedRecord> = match factory.record_class(record_schema) {
                Some(class) => class.new_instance(record_schema),
                None => Box::new(GenericRecord::new(record_schema.clone())),
            };
            for field in record_schema.fields() {
                let field_json = object
                    .get(field.name())
                    .or_else(|| field.default_value())
                    .ok_or_else(|| {
                        format!(
                            "no value for field '{}' of record {}",
                            field.name(),
                            record_schema.name()
                        )
                    })?;
                let value = json_to_value(field.schema(), field_json, factory)?;
                record
                    .put(field.pos(), value)
                    .map_err(|e| e.to_string())?;
            }
            Ok(record.into_value())
        }
        Schema::Union(members) => {
            let first = members
                .first()
                .ok_or_else(|| "empty union has no default".to_string())?;
            json_to_value(first, json, factory)
        }
    }
}

fn latin1_bytes(text: &str) -> std::result::Result<Vec<u8>, String> {
    text.chars()
        .map(|c| u8::try_from(c as u32).map_err(|_| format!("character '{c}' is not a byte")))
        .collect()
}
