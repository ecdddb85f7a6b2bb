//! Derivation of a physical layout from a logical record schema.
//!
//! The derived layout is the one a writer produces for the logical schema,
//! and the one a [`RecordMaterializer`](crate::materializer::RecordMaterializer)
//! binds against when no physical schema is supplied:
//!
//! - nullable types (`union<null, T>`) become `optional` fields of `T`;
//! - other unions become a group with one optional `member<i>` field per
//!   non-null member;
//! - arrays use the three-level `list`/`element` layout, or the legacy
//!   two-level `array` layout on request;
//! - maps use a repeated `key_value` group with a required UTF-8 key.

use strata_common::{Result, error::Error};
use strata_format::{
    schema::{GroupType, PrimitiveKind, PrimitiveType, Repetition, Type},
    schema_builder,
};
use strata_model::{
    Schema,
    schema::{Field, RecordSchema},
};

use crate::options::ConverterOptions;

/// Converts logical record schemas to physical message layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConverter {
    legacy_lists: bool,
}

impl SchemaConverter {
    pub fn new() -> SchemaConverter {
        SchemaConverter::default()
    }

    pub fn from_options(options: &ConverterOptions) -> SchemaConverter {
        SchemaConverter::new().with_legacy_lists(options.legacy_lists())
    }

    /// Uses the two-level list layout, which cannot represent null elements.
    pub fn with_legacy_lists(self, legacy_lists: bool) -> Self {
        Self { legacy_lists }
    }

    /// Derives the physical message for a record schema.
    ///
    /// # Errors
    ///
    /// Returns an error for fields without a physical representation: `null`
    /// fields, unions of only `null`, and nullable elements of legacy lists.
    pub fn convert(&self, schema: &RecordSchema) -> Result<GroupType> {
        Ok(GroupType::new_message(
            schema.name(),
            self.convert_fields(schema.fields())?,
        ))
    }

    fn convert_fields(&self, fields: &[Field]) -> Result<Vec<Type>> {
        fields
            .iter()
            .map(|field| self.convert_field(field.name(), field.schema(), Repetition::Required))
            .collect()
    }

    fn convert_field(&self, name: &str, schema: &Schema, repetition: Repetition) -> Result<Type> {
        let primitive = |kind: PrimitiveKind| -> Result<Type> {
            Ok(PrimitiveType::new(name, repetition, kind).into())
        };
        match schema {
            Schema::Null => Err(no_representation(name, schema)),
            Schema::Boolean => primitive(PrimitiveKind::Boolean),
            Schema::Int => primitive(PrimitiveKind::Int32),
            Schema::Long => primitive(PrimitiveKind::Int64),
            Schema::Float => primitive(PrimitiveKind::Float),
            Schema::Double => primitive(PrimitiveKind::Double),
            Schema::Bytes => primitive(PrimitiveKind::Binary),
            Schema::Fixed(fixed) => primitive(PrimitiveKind::FixedLenByteArray(fixed.size())),
            Schema::String => Ok(schema_builder::string(repetition, name)),
            Schema::Enum(_) => Ok(schema_builder::enum_symbol(repetition, name)),
            Schema::Record(record) => Ok(schema_builder::group(
                repetition,
                name,
                self.convert_fields(record.fields())?,
            )),
            Schema::Array(element) => self.convert_list(name, element, repetition),
            Schema::Map(value) => Ok(schema_builder::map(
                repetition,
                name,
                self.convert_field("value", value, Repetition::Required)?,
            )),
            Schema::Union(members) => {
                let inner = schema.non_null();
                if !std::ptr::eq(inner, schema) {
                    return self.convert_field(name, inner, Repetition::Optional);
                }
                let nullable = members.iter().any(|m| matches!(m, Schema::Null));
                let repetition = if nullable {
                    Repetition::Optional
                } else {
                    repetition
                };
                let fields = schema
                    .non_null_members()
                    .enumerate()
                    .map(|(i, member)| {
                        self.convert_field(&format!("member{i}"), member, Repetition::Optional)
                    })
                    .collect::<Result<Vec<_>>>()?;
                if fields.is_empty() {
                    return Err(no_representation(name, schema));
                }
                Ok(schema_builder::group(repetition, name, fields))
            }
        }
    }

    fn convert_list(&self, name: &str, element: &Schema, repetition: Repetition) -> Result<Type> {
        if self.legacy_lists {
            if !std::ptr::eq(element.non_null(), element) {
                return Err(Error::invalid_arg(
                    "schema",
                    format!("legacy list '{name}' cannot hold nullable elements ({element})"),
                ));
            }
            let element = self.convert_field("array", element, Repetition::Repeated)?;
            Ok(schema_builder::legacy_list(repetition, name, element))
        } else {
            let element = self.convert_field("element", element, Repetition::Required)?;
            Ok(schema_builder::list(repetition, name, element))
        }
    }
}

fn no_representation(name: &str, schema: &Schema) -> Error {
    Error::invalid_arg(
        "schema",
        format!("field '{name}' of type {schema} has no physical representation"),
    )
}

#[cfg(test)]
mod tests {
    use strata_format::schema::OriginalType;
    use strata_model::schema::{EnumSchema, FixedSchema};

    use super::*;

    fn sample() -> std::sync::Arc<RecordSchema> {
        RecordSchema::new(
            "Event",
            vec![
                Field::new("id", Schema::Long),
                Field::new("note", Schema::nullable(Schema::String)),
                Field::new("kind", Schema::Enum(EnumSchema::new("Kind", ["A", "B"]))),
                Field::new("digest", Schema::Fixed(FixedSchema::new("Md5", 16))),
                Field::new("scores", Schema::array(Schema::nullable(Schema::Int))),
                Field::new("attrs", Schema::map(Schema::Double)),
                Field::new(
                    "payload",
                    Schema::Union(vec![Schema::Null, Schema::Int, Schema::String]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_derived_layout() {
        let message = SchemaConverter::new().convert(&sample()).unwrap();
        assert_eq!(message.name(), "Event");
        let text = message.to_message_string();
        assert!(text.contains("  required int64 id;\n"));
        assert!(text.contains("  optional binary note (UTF8);\n"));
        assert!(text.contains("  required binary kind (ENUM);\n"));
        assert!(text.contains("  required fixed_len_byte_array(16) digest;\n"));
        assert!(text.contains("    repeated group list {\n      optional int32 element;\n"));
        assert!(text.contains("      required double value;\n"));
        assert!(text.contains(
            "  optional group payload {\n    optional int32 member0;\n    optional binary member1 (UTF8);\n"
        ));

        let attrs = message.find_field("attrs").unwrap().1;
        assert_eq!(attrs.original_type(), Some(OriginalType::Map));
    }

    #[test]
    fn test_legacy_lists() {
        let schema = RecordSchema::new(
            "R",
            vec![Field::new("scores", Schema::array(Schema::Int))],
        )
        .unwrap();
        let message = SchemaConverter::new()
            .with_legacy_lists(true)
            .convert(&schema)
            .unwrap();
        assert_eq!(
            message.field(0).unwrap().to_string(),
            "required group scores (LIST) { repeated int32 array; }"
        );

        let converter = SchemaConverter::from_options(&ConverterOptions::new().with_legacy_lists(true));
        assert!(converter.convert(&sample()).is_err());
    }

    #[test]
    fn test_null_fields_have_no_representation() {
        let schema = RecordSchema::new("R", vec![Field::new("nothing", Schema::Null)]).unwrap();
        assert!(SchemaConverter::new().convert(&schema).is_err());

        let schema = RecordSchema::new(
            "R",
            vec![Field::new("nothing", Schema::Union(vec![Schema::Null]))],
        )
        .unwrap();
        assert!(SchemaConverter::new().convert(&schema).is_err());
    }
}
