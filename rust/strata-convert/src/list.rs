//! List converters.
//!
//! A list is a physical group with exactly one repeated child. Depending on
//! how the data was written, that child is either the element itself (the
//! legacy two-level layout, and repeated groups of records) or a synthetic
//! wrapper group whose only field is the element (the three-level layout).

use log::debug;
use strata_common::{Result, error::Error, result::verify_field_index};
use strata_format::schema::{GroupType, Type};
use strata_model::{Schema, Value};

use crate::{
    converter::{BindContext, Converter, GroupConverter},
    event::PrimitiveValue,
    sink::{AppendSink, SlotSink, ValueSink},
};

/// Converter for a physical list group materialized as an array.
pub struct ListConverter {
    /// Converter of the repeated child: the element converter itself, or an
    /// [`ElementConverter`] for a synthetic wrapper.
    element: Box<Converter>,
    current: Option<Vec<Value>>,
}

impl ListConverter {
    /// Binds a list converter for the logical array `schema`.
    ///
    /// # Errors
    ///
    /// Returns an `UnsupportedConversion` error if `schema` is not an array or
    /// the physical group does not have exactly one field, and any error from
    /// binding the element.
    pub fn new(physical: &GroupType, schema: &Schema, ctx: &BindContext) -> Result<ListConverter> {
        let Schema::Array(element_schema) = schema else {
            return Err(Error::unsupported_conversion(
                schema.to_string(),
                physical.to_string(),
            ));
        };
        if physical.field_count() != 1 {
            return Err(Error::unsupported_conversion(
                schema.to_string(),
                physical.to_string(),
            ));
        }

        let repeated = physical.field(0)?;
        let element_schema = element_schema.non_null();
        let element = if is_element_type(repeated, element_schema) {
            debug!(
                "list '{}': repeated field '{}' is the element",
                physical.name(),
                repeated.name()
            );
            Converter::new(element_schema, repeated, ctx)?
        } else {
            debug!(
                "list '{}': repeated field '{}' wraps the element",
                physical.name(),
                repeated.name()
            );
            let wrapper = expect_wrapper(element_schema, repeated)?;
            GroupConverter::ListElement(ElementConverter::new(wrapper, element_schema, ctx)?).into()
        };

        Ok(ListConverter {
            element: Box::new(element),
            current: None,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        self.current = Some(Vec::new());
        Ok(())
    }

    pub fn end(&mut self, sink: &mut dyn ValueSink) -> Result<()> {
        let items = self.current.take().ok_or_else(not_started)?;
        sink.add(Value::Array(items))
    }

    pub(crate) fn child(&mut self, index: usize) -> Result<&mut Converter> {
        verify_field_index(index, 1)?;
        Ok(&mut *self.element)
    }

    pub(crate) fn end_child(&mut self, index: usize) -> Result<()> {
        verify_field_index(index, 1)?;
        let items = self.current.as_mut().ok_or_else(not_started)?;
        self.element.as_group_mut()?.end(&mut AppendSink { items })
    }

    pub(crate) fn add_to_child(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        verify_field_index(index, 1)?;
        let items = self.current.as_mut().ok_or_else(not_started)?;
        self.element
            .as_primitive_mut()?
            .add(event, &mut AppendSink { items })
    }
}

/// Converter for the synthetic group wrapping each list element.
///
/// An occurrence of the wrapper with no element value contributes a `null`
/// element.
pub struct ElementConverter {
    element: Box<Converter>,
    slot: Option<Value>,
}

impl ElementConverter {
    /// Binds the wrapper group; its single field is the element.
    pub fn new(physical: &GroupType, schema: &Schema, ctx: &BindContext) -> Result<ElementConverter> {
        if physical.field_count() != 1 {
            return Err(Error::unsupported_conversion(
                schema.to_string(),
                physical.to_string(),
            ));
        }
        Ok(ElementConverter {
            element: Box::new(Converter::new(schema, physical.field(0)?, ctx)?),
            slot: None,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        self.slot = None;
        Ok(())
    }

    pub fn end(&mut self, sink: &mut dyn ValueSink) -> Result<()> {
        sink.add(self.slot.take().unwrap_or(Value::Null))
    }

    pub(crate) fn child(&mut self, index: usize) -> Result<&mut Converter> {
        verify_field_index(index, 1)?;
        Ok(&mut *self.element)
    }

    pub(crate) fn end_child(&mut self, index: usize) -> Result<()> {
        verify_field_index(index, 1)?;
        self.element
            .as_group_mut()?
            .end(&mut SlotSink { slot: &mut self.slot })
    }

    pub(crate) fn add_to_child(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        verify_field_index(index, 1)?;
        self.element
            .as_primitive_mut()?
            .add(event, &mut SlotSink { slot: &mut self.slot })
    }
}

/// Decides whether the repeated child of a list group is the element itself
/// rather than a synthetic wrapper around it.
///
/// The repeated child is the element if it is a primitive, if it is a group
/// with more than one field, or if the element is a record with a single
/// field whose name matches the sole field of the repeated group.
pub fn is_element_type(repeated: &Type, element_schema: &Schema) -> bool {
    let group = match repeated {
        Type::Primitive(_) => return true,
        Type::Group(group) if group.field_count() > 1 => return true,
        Type::Group(group) => group,
    };
    match (element_schema, group.fields()) {
        (Schema::Record(record), [only]) => {
            record.len() == 1 && record.fields()[0].name() == only.name()
        }
        _ => false,
    }
}

fn expect_wrapper<'p>(element_schema: &Schema, repeated: &'p Type) -> Result<&'p GroupType> {
    match repeated {
        Type::Group(group) => Ok(group),
        Type::Primitive(_) => Err(Error::unsupported_conversion(
            element_schema.to_string(),
            repeated.to_string(),
        )),
    }
}

fn not_started() -> Error {
    Error::invalid_operation("list has not been started")
}
