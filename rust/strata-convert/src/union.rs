//! Union converter.
//!
//! A union with more than one non-null member is stored as a group with one
//! optional field per non-null member, in member order. At most one of those
//! fields may be present in any occurrence.

use strata_common::{Result, error::Error, result::verify_field_index};
use strata_format::schema::GroupType;
use strata_model::{Schema, Value};

use crate::{
    converter::{BindContext, Converter},
    event::PrimitiveValue,
    sink::{UnionMemberSink, ValueSink},
};

/// Converter for a physical union group.
pub struct UnionConverter {
    /// Display name of the union, for diagnostics.
    name: String,
    members: Vec<Converter>,
    held: Option<Value>,
}

impl UnionConverter {
    /// Binds one converter per non-null member, pairing members with the
    /// physical group's fields by position.
    ///
    /// # Errors
    ///
    /// Returns an `UnsupportedConversion` error if the number of physical
    /// fields differs from the number of non-null members, and any error from
    /// binding a member.
    pub fn new(physical: &GroupType, schema: &Schema, ctx: &BindContext) -> Result<UnionConverter> {
        let members = schema.non_null_members().collect::<Vec<_>>();
        if members.is_empty() || members.len() != physical.field_count() {
            return Err(Error::unsupported_conversion(
                schema.to_string(),
                physical.to_string(),
            ));
        }
        let members = members
            .into_iter()
            .zip(physical.fields())
            .map(|(member, field_type)| Converter::new(member, field_type, ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(UnionConverter {
            name: schema.to_string(),
            members,
            held: None,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        self.held = None;
        Ok(())
    }

    /// Delivers the single member value, or `null` if no member was present.
    pub fn end(&mut self, sink: &mut dyn ValueSink) -> Result<()> {
        sink.add(self.held.take().unwrap_or(Value::Null))
    }

    pub(crate) fn child(&mut self, index: usize) -> Result<&mut Converter> {
        verify_field_index(index, self.members.len())?;
        Ok(&mut self.members[index])
    }

    pub(crate) fn end_child(&mut self, index: usize) -> Result<()> {
        verify_field_index(index, self.members.len())?;
        let mut sink = UnionMemberSink {
            held: &mut self.held,
            union: &self.name,
        };
        self.members[index].as_group_mut()?.end(&mut sink)
    }

    pub(crate) fn add_to_child(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        verify_field_index(index, self.members.len())?;
        let mut sink = UnionMemberSink {
            held: &mut self.held,
            union: &self.name,
        };
        self.members[index].as_primitive_mut()?.add(event, &mut sink)
    }
}

#[cfg(test)]
mod tests {
    use strata_common::error::ErrorKind;
    use strata_format::{
        schema::{PrimitiveKind, Repetition},
        schema_builder::{group, optional, string},
    };
    use strata_model::GenericFactory;

    use super::*;
    use crate::{converter::GroupConverter, options::ConverterOptions};

    fn int_or_string() -> (GroupConverter, Schema) {
        let schema = Schema::Union(vec![Schema::Null, Schema::Int, Schema::String]);
        let physical = group(
            Repetition::Optional,
            "choice",
            vec![
                optional(PrimitiveKind::Int32, "member0"),
                string(Repetition::Optional, "member1"),
            ],
        );
        let options = ConverterOptions::default();
        let ctx = BindContext::new(&GenericFactory, &options);
        let converter = UnionConverter::new(physical.as_group().unwrap(), &schema, &ctx).unwrap();
        (GroupConverter::Union(converter), schema)
    }

    fn finish(converter: &mut GroupConverter) -> Value {
        let mut out = None;
        converter
            .end(&mut |value: Value| -> Result<()> {
                out = Some(value);
                Ok(())
            })
            .unwrap();
        out.unwrap()
    }

    #[test]
    fn test_single_member() {
        let (mut converter, _) = int_or_string();
        converter.start().unwrap();
        converter
            .add_to_child(1, PrimitiveValue::Binary(b"seven"))
            .unwrap();
        assert_eq!(finish(&mut converter), Value::from("seven"));

        converter.start().unwrap();
        assert_eq!(finish(&mut converter), Value::Null);
    }

    #[test]
    fn test_two_members_conflict() {
        let (mut converter, _) = int_or_string();
        converter.start().unwrap();
        converter.add_to_child(0, PrimitiveValue::Int(7)).unwrap();
        let err = converter
            .add_to_child(1, PrimitiveValue::Binary(b"seven"))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnionConflict { .. }));
    }

    #[test]
    fn test_member_count_must_match() {
        let schema = Schema::Union(vec![Schema::Int, Schema::String, Schema::Double]);
        let physical = group(
            Repetition::Required,
            "choice",
            vec![optional(PrimitiveKind::Int32, "member0")],
        );
        let options = ConverterOptions::default();
        let ctx = BindContext::new(&GenericFactory, &options);
        assert!(UnionConverter::new(physical.as_group().unwrap(), &schema, &ctx).is_err());
    }
}
