//! Logical schema definitions.
//!
//! A logical schema describes the object shape requested by the consumer. It is
//! immutable once built and is shared through `Arc` for the named types
//! (records, enums and fixed), so that binding a converter tree and resolving
//! classes through an object factory never needs to copy it.

use std::{fmt, sync::Arc};

use ahash::AHashMap;
use itertools::Itertools;
use strata_common::{Result, error::Error};

/// The closed set of logical kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record,
    Enum,
    Array,
    Map,
    Union,
    Fixed,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Int => "int",
            SchemaKind::Long => "long",
            SchemaKind::Float => "float",
            SchemaKind::Double => "double",
            SchemaKind::Bytes => "bytes",
            SchemaKind::String => "string",
            SchemaKind::Record => "record",
            SchemaKind::Enum => "enum",
            SchemaKind::Array => "array",
            SchemaKind::Map => "map",
            SchemaKind::Union => "union",
            SchemaKind::Fixed => "fixed",
        }
    }

    /// Scalars are copied by value; every other kind owns nested state.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            SchemaKind::Boolean
                | SchemaKind::Int
                | SchemaKind::Long
                | SchemaKind::Float
                | SchemaKind::Double
        )
    }
}

/// A node of the logical schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(Arc<RecordSchema>),
    Enum(Arc<EnumSchema>),
    /// Ordered sequence of the element type.
    Array(Box<Schema>),
    /// Text-keyed mapping to the value type.
    Map(Box<Schema>),
    /// One of the member types.
    Union(Vec<Schema>),
    Fixed(Arc<FixedSchema>),
}

impl Schema {
    pub fn array(element: Schema) -> Schema {
        Schema::Array(Box::new(element))
    }

    pub fn map(value: Schema) -> Schema {
        Schema::Map(Box::new(value))
    }

    /// The usual encoding of a nullable value: `union<null, schema>`.
    pub fn nullable(schema: Schema) -> Schema {
        Schema::Union(vec![Schema::Null, schema])
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Null => SchemaKind::Null,
            Schema::Boolean => SchemaKind::Boolean,
            Schema::Int => SchemaKind::Int,
            Schema::Long => SchemaKind::Long,
            Schema::Float => SchemaKind::Float,
            Schema::Double => SchemaKind::Double,
            Schema::Bytes => SchemaKind::Bytes,
            Schema::String => SchemaKind::String,
            Schema::Record(_) => SchemaKind::Record,
            Schema::Enum(_) => SchemaKind::Enum,
            Schema::Array(_) => SchemaKind::Array,
            Schema::Map(_) => SchemaKind::Map,
            Schema::Union(_) => SchemaKind::Union,
            Schema::Fixed(_) => SchemaKind::Fixed,
        }
    }

    /// Returns the full name of named types (records, enums and fixed).
    pub fn name(&self) -> Option<&str> {
        match self {
            Schema::Record(r) => Some(r.name()),
            Schema::Enum(e) => Some(e.name()),
            Schema::Fixed(f) => Some(f.name()),
            _ => None,
        }
    }

    /// Strips the nullable encoding: for a two-member union where one member is
    /// `null`, returns the other member. Any other schema is returned unchanged.
    pub fn non_null(&self) -> &Schema {
        match self {
            Schema::Union(members) if members.len() == 2 => {
                match (&members[0], &members[1]) {
                    (Schema::Null, other) | (other, Schema::Null) => other,
                    _ => self,
                }
            }
            _ => self,
        }
    }

    /// Members of a union that occupy a slot in the physical layout.
    pub fn non_null_members(&self) -> impl Iterator<Item = &Schema> {
        let members: &[Schema] = match self {
            Schema::Union(members) => members,
            _ => &[],
        };
        members.iter().filter(|m| !matches!(m, Schema::Null))
    }

    pub fn as_record(&self) -> Result<&Arc<RecordSchema>> {
        match self {
            Schema::Record(r) => Ok(r),
            other => Err(Error::invalid_arg(
                "schema",
                format!("expected a record, found {other}"),
            )),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Record(r) => write!(f, "record {}", r.name()),
            Schema::Enum(e) => write!(f, "enum {}", e.name()),
            Schema::Fixed(x) => write!(f, "fixed {}({})", x.name(), x.size()),
            Schema::Array(element) => write!(f, "array<{element}>"),
            Schema::Map(value) => write!(f, "map<string, {value}>"),
            Schema::Union(members) => write!(f, "union<{}>", members.iter().join(", ")),
            scalar => f.write_str(scalar.kind().as_str()),
        }
    }
}

/// A field of a logical record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    schema: Schema,
    aliases: Vec<String>,
    /// Declared default, in its JSON form.
    default: Option<serde_json::Value>,
    pos: usize,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Field {
        Field {
            name: name.into(),
            schema,
            aliases: Vec::new(),
            default: None,
            pos: 0,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Field
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Field {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a == name)
    }

    pub fn default_value(&self) -> Option<&serde_json::Value> {
        self.default.as_ref()
    }

    /// Position of the field within its record.
    pub fn pos(&self) -> usize {
        self.pos
    }
}

/// A named logical record with ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<Field>,
    field_map: AHashMap<String, usize>,
}

impl RecordSchema {
    /// Creates a record schema, assigning field positions in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or if two fields share a name.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Arc<RecordSchema>> {
        let name = name.into();
        strata_common::verify_arg!(name, !name.is_empty());
        let mut field_map = AHashMap::with_capacity(fields.len());
        let mut positioned = Vec::with_capacity(fields.len());
        for (pos, mut field) in fields.into_iter().enumerate() {
            if field_map.insert(field.name.clone(), pos).is_some() {
                return Err(Error::invalid_arg(
                    "fields",
                    format!("duplicate field '{}' in record {name}", field.name),
                ));
            }
            field.pos = pos;
            positioned.push(field);
        }
        Ok(Arc::new(RecordSchema {
            name,
            fields: positioned,
            field_map,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Finds a field by its exact name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|&pos| &self.fields[pos])
    }

    pub fn field_at(&self, pos: usize) -> Option<&Field> {
        self.fields.get(pos)
    }
}

/// A named logical enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    name: String,
    symbols: Vec<String>,
}

impl EnumSchema {
    pub fn new<I, S>(name: impl Into<String>, symbols: I) -> Arc<EnumSchema>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(EnumSchema {
            name: name.into(),
            symbols: symbols.into_iter().map(Into::into).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

/// A named fixed-length binary type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSchema {
    name: String,
    size: usize,
}

impl FixedSchema {
    pub fn new(name: impl Into<String>, size: usize) -> Arc<FixedSchema> {
        Arc::new(FixedSchema {
            name: name.into(),
            size,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
