//! The converter tree.
//!
//! A converter tree is bound once from a logical schema and the physical
//! schema of the data, then reused for every record. Every node is one
//! variant of [`Converter`]: leaves are [`PrimitiveConverter`]s, interior
//! nodes are [`GroupConverter`]s that own the value under construction and
//! lend their children a [`ValueSink`] for the slot each child fills.

use ahash::AHashMap;
use strata_common::{Result, error::Error};
use strata_format::schema::{GroupType, Type};
use strata_model::{ObjectFactory, Schema, Value};

use crate::{
    event::PrimitiveValue,
    list::{ElementConverter, ListConverter},
    map::{KeyValueConverter, MapConverter},
    options::ConverterOptions,
    primitive::PrimitiveConverter,
    record::RecordConverter,
    sink::ValueSink,
    union::UnionConverter,
};

/// Everything a converter tree consults while it is being bound.
#[derive(Clone, Copy)]
pub struct BindContext<'a> {
    factory: &'a dyn ObjectFactory,
    options: &'a ConverterOptions,
}

impl<'a> BindContext<'a> {
    pub fn new(factory: &'a dyn ObjectFactory, options: &'a ConverterOptions) -> BindContext<'a> {
        BindContext { factory, options }
    }

    pub fn factory(&self) -> &'a dyn ObjectFactory {
        self.factory
    }

    pub fn options(&self) -> &'a ConverterOptions {
        self.options
    }
}

/// A node of the converter tree.
pub enum Converter {
    /// Leaf: consumes primitive events.
    Primitive(PrimitiveConverter),
    /// Interior node: consumes start/end events and routes its children's
    /// values.
    Group(GroupConverter),
}

impl Converter {
    /// Binds the converter that materializes values of the logical `schema`
    /// from the physical field `physical`.
    ///
    /// A nullable schema binds as its non-null member; nullability is carried
    /// by the physical repetition.
    ///
    /// # Errors
    ///
    /// Returns a bind error (see [`Error::is_bind_error`]) if the two schemas
    /// cannot be paired, or if a class resolved through the object factory is
    /// unusable.
    pub fn new(schema: &Schema, physical: &Type, ctx: &BindContext) -> Result<Converter> {
        let schema = schema.non_null();
        let converter = match schema {
            Schema::Record(record) => GroupConverter::Record(RecordConverter::new(
                expect_group(schema, physical)?,
                record,
                ctx,
            )?)
            .into(),
            Schema::Array(_) => GroupConverter::List(ListConverter::new(
                expect_group(schema, physical)?,
                schema,
                ctx,
            )?)
            .into(),
            Schema::Map(_) => GroupConverter::Map(MapConverter::new(
                expect_group(schema, physical)?,
                schema,
                ctx,
            )?)
            .into(),
            Schema::Union(_) => GroupConverter::Union(UnionConverter::new(
                expect_group(schema, physical)?,
                schema,
                ctx,
            )?)
            .into(),
            Schema::Null => {
                return Err(Error::unsupported_conversion(
                    schema.to_string(),
                    physical.to_string(),
                ));
            }
            _ => match physical {
                Type::Primitive(primitive) => {
                    Converter::Primitive(PrimitiveConverter::new(schema, primitive, ctx)?)
                }
                Type::Group(_) => {
                    return Err(Error::unsupported_conversion(
                        schema.to_string(),
                        physical.to_string(),
                    ));
                }
            },
        };
        Ok(converter)
    }

    /// Creates a converter that consumes and ignores all events for the
    /// physical field.
    pub fn no_op(physical: &Type) -> Converter {
        match physical {
            Type::Primitive(_) => Converter::Primitive(PrimitiveConverter::no_op()),
            Type::Group(_) => Converter::Group(GroupConverter::NoOp),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Converter::Primitive(_))
    }

    /// Views the node as a group converter.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidOperation` error for a leaf.
    pub fn as_group_mut(&mut self) -> Result<&mut GroupConverter> {
        match self {
            Converter::Group(group) => Ok(group),
            Converter::Primitive(_) => Err(Error::invalid_operation(
                "group event delivered to a primitive converter",
            )),
        }
    }

    /// Views the node as a primitive converter.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidOperation` error for a group.
    pub fn as_primitive_mut(&mut self) -> Result<&mut PrimitiveConverter> {
        match self {
            Converter::Primitive(primitive) => Ok(primitive),
            Converter::Group(_) => Err(Error::invalid_operation(
                "primitive event delivered to a group converter",
            )),
        }
    }
}

impl From<GroupConverter> for Converter {
    fn from(group: GroupConverter) -> Self {
        Converter::Group(group)
    }
}

impl From<PrimitiveConverter> for Converter {
    fn from(primitive: PrimitiveConverter) -> Self {
        Converter::Primitive(primitive)
    }
}

/// An interior node of the converter tree.
///
/// Children are addressed by the positional index of their physical field
/// within the group. The driver reaches a nested group by following
/// [`child_group`](Self::child_group) from the root, so no node needs a
/// reference to its parent.
pub enum GroupConverter {
    /// A physical group with no logical counterpart; every event below it is
    /// ignored.
    NoOp,
    Record(RecordConverter),
    List(ListConverter),
    /// Synthetic wrapper around each element of a list.
    ListElement(ElementConverter),
    Map(MapConverter),
    /// One key/value entry of a map; completed by its map, never on its own.
    MapEntry(KeyValueConverter),
    Union(UnionConverter),
}

impl GroupConverter {
    /// Prepares a fresh value for a new occurrence of the group.
    pub fn start(&mut self) -> Result<()> {
        match self {
            GroupConverter::NoOp => Ok(()),
            GroupConverter::Record(record) => record.start(),
            GroupConverter::List(list) => list.start(),
            GroupConverter::ListElement(element) => element.start(),
            GroupConverter::Map(map) => map.start(),
            GroupConverter::MapEntry(entry) => entry.start(),
            GroupConverter::Union(union) => union.start(),
        }
    }

    /// Completes the current occurrence and delivers its value to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if no occurrence is in progress, if the value is
    /// incomplete in a way the node rejects, or if the sink rejects the value.
    pub fn end(&mut self, sink: &mut dyn ValueSink) -> Result<()> {
        match self {
            GroupConverter::NoOp => Ok(()),
            GroupConverter::Record(record) => record.end(sink),
            GroupConverter::List(list) => list.end(sink),
            GroupConverter::ListElement(element) => element.end(sink),
            GroupConverter::Map(map) => map.end(sink),
            GroupConverter::MapEntry(_) => Err(Error::invalid_operation(
                "map entry completed outside of its map",
            )),
            GroupConverter::Union(union) => union.end(sink),
        }
    }

    /// Returns the group converter of the child at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the child is a leaf.
    pub fn child_group(&mut self, index: usize) -> Result<&mut GroupConverter> {
        match self {
            GroupConverter::NoOp => Ok(self),
            GroupConverter::Record(record) => record.child(index)?.as_group_mut(),
            GroupConverter::List(list) => list.child(index)?.as_group_mut(),
            GroupConverter::ListElement(element) => element.child(index)?.as_group_mut(),
            GroupConverter::Map(map) => map.entry(index),
            GroupConverter::MapEntry(entry) => entry.child(index)?.as_group_mut(),
            GroupConverter::Union(union) => union.child(index)?.as_group_mut(),
        }
    }

    /// Completes the child group at `index`, storing its value in this
    /// group's value under construction.
    pub fn end_child(&mut self, index: usize) -> Result<()> {
        match self {
            GroupConverter::NoOp => Ok(()),
            GroupConverter::Record(record) => record.end_child(index),
            GroupConverter::List(list) => list.end_child(index),
            GroupConverter::ListElement(element) => element.end_child(index),
            GroupConverter::Map(map) => map.end_entry(index),
            GroupConverter::MapEntry(entry) => entry.end_child(index),
            GroupConverter::Union(union) => union.end_child(index),
        }
    }

    /// Delivers a primitive event to the leaf child at `index`.
    pub fn add_to_child(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        match self {
            GroupConverter::NoOp => Ok(()),
            GroupConverter::Record(record) => record.add_to_child(index, event),
            GroupConverter::List(list) => list.add_to_child(index, event),
            GroupConverter::ListElement(element) => element.add_to_child(index, event),
            GroupConverter::Map(map) => map.add_to_entry(index, event),
            GroupConverter::MapEntry(entry) => entry.add_to_child(index, event),
            GroupConverter::Union(union) => union.add_to_child(index, event),
        }
    }

    /// Completes a map entry into `map`. Only valid on a map entry node.
    pub(crate) fn end_map_entry(&mut self, map: &mut AHashMap<String, Value>) -> Result<()> {
        match self {
            GroupConverter::MapEntry(entry) => entry.end_into(map),
            _ => Err(Error::invalid_operation(
                "only a map entry can be completed into a map",
            )),
        }
    }
}

fn expect_group<'p>(schema: &Schema, physical: &'p Type) -> Result<&'p GroupType> {
    match physical {
        Type::Group(group) => Ok(group),
        Type::Primitive(_) => Err(Error::unsupported_conversion(
            schema.to_string(),
            physical.to_string(),
        )),
    }
}

