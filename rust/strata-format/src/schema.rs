use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strata_common::{Result, error::Error};

/// Repetition of a physical field within its parent group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repetition {
    /// Exactly one value per parent occurrence.
    Required,
    /// Zero or one value per parent occurrence.
    Optional,
    /// Zero or more values per parent occurrence.
    Repeated,
}

impl Repetition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Repetition::Required => "required",
            Repetition::Optional => "optional",
            Repetition::Repeated => "repeated",
        }
    }
}

/// Storage-level primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Boolean,
    Int32,
    Int64,
    /// Legacy 12-byte timestamp: nanosecond-of-day (`i64` LE) followed by
    /// the Julian day number (`i32` LE).
    Int96,
    Float,
    Double,
    /// Variable-length byte sequence.
    Binary,
    /// Fixed-length byte sequence of the given length.
    FixedLenByteArray(usize),
}

impl PrimitiveKind {
    /// Returns `true` for kinds whose values arrive as byte sequences.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Binary | PrimitiveKind::FixedLenByteArray(_) | PrimitiveKind::Int96
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::Boolean => f.write_str("boolean"),
            PrimitiveKind::Int32 => f.write_str("int32"),
            PrimitiveKind::Int64 => f.write_str("int64"),
            PrimitiveKind::Int96 => f.write_str("int96"),
            PrimitiveKind::Float => f.write_str("float"),
            PrimitiveKind::Double => f.write_str("double"),
            PrimitiveKind::Binary => f.write_str("binary"),
            PrimitiveKind::FixedLenByteArray(len) => write!(f, "fixed_len_byte_array({len})"),
        }
    }
}

/// Annotations that refine how a physical node is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginalType {
    Utf8,
    Enum,
    List,
    Map,
    MapKeyValue,
}

impl OriginalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginalType::Utf8 => "UTF8",
            OriginalType::Enum => "ENUM",
            OriginalType::List => "LIST",
            OriginalType::Map => "MAP",
            OriginalType::MapKeyValue => "MAP_KEY_VALUE",
        }
    }
}

/// A primitive (leaf) node of the physical schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveType {
    name: String,
    repetition: Repetition,
    kind: PrimitiveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_type: Option<OriginalType>,
}

impl PrimitiveType {
    pub fn new(name: impl Into<String>, repetition: Repetition, kind: PrimitiveKind) -> Self {
        PrimitiveType {
            name: name.into(),
            repetition,
            kind,
            original_type: None,
        }
    }

    pub fn with_original_type(mut self, original_type: OriginalType) -> Self {
        self.original_type = Some(original_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn original_type(&self) -> Option<OriginalType> {
        self.original_type
    }
}

/// A group node of the physical schema: an ordered list of named children.
///
/// The position of a child within `fields` is its field index, which is what the
/// decoder uses to address the child when it emits events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupType {
    name: String,
    repetition: Repetition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_type: Option<OriginalType>,
    fields: Vec<Type>,
}

impl GroupType {
    pub fn new(name: impl Into<String>, repetition: Repetition, fields: Vec<Type>) -> Self {
        GroupType {
            name: name.into(),
            repetition,
            original_type: None,
            fields,
        }
    }

    /// Creates the root group of a physical record layout.
    pub fn new_message(name: impl Into<String>, fields: Vec<Type>) -> Self {
        GroupType::new(name, Repetition::Required, fields)
    }

    pub fn with_original_type(mut self, original_type: OriginalType) -> Self {
        self.original_type = Some(original_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn original_type(&self) -> Option<OriginalType> {
        self.original_type
    }

    pub fn fields(&self) -> &[Type] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns the child at the given field index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds.
    pub fn field(&self, index: usize) -> Result<&Type> {
        self.fields.get(index).ok_or_else(|| {
            Error::invalid_arg(
                "index",
                format!("group '{}' has no field at index {index}", self.name),
            )
        })
    }

    /// Returns the name of the child at the given field index.
    pub fn field_name(&self, index: usize) -> Result<&str> {
        self.field(index).map(Type::name)
    }

    /// Finds a child by name, returning its field index together with the child.
    pub fn find_field(&self, name: &str) -> Option<(usize, &Type)> {
        self.fields.iter().find_position(|f| f.name() == name)
    }

    /// Returns a JSON representation of the group.
    ///
    /// # Arguments
    ///
    /// * `indent` - `0` produces compact JSON, anything else pretty-prints.
    pub fn to_json_string(&self, indent: usize) -> Result<String> {
        let res = if indent == 0 {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        };
        res.map_err(|e| Error::json("physical schema", e))
    }

    /// Parses a group previously produced by [`to_json_string`](Self::to_json_string).
    pub fn from_json(json: &str) -> Result<GroupType> {
        serde_json::from_str(json).map_err(|e| Error::json("physical schema", e))
    }

    /// Renders the group as a `message` block, the way a complete physical
    /// record layout is usually printed.
    pub fn to_message_string(&self) -> String {
        let mut out = format!("message {} {{\n", self.name);
        for field in &self.fields {
            write_type(&mut out, field, 1);
        }
        out.push('}');
        out
    }
}

/// A node of the physical schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Primitive(PrimitiveType),
    Group(GroupType),
}

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::Primitive(p) => p.name(),
            Type::Group(g) => g.name(),
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            Type::Primitive(p) => p.repetition(),
            Type::Group(g) => g.repetition(),
        }
    }

    pub fn original_type(&self) -> Option<OriginalType> {
        match self {
            Type::Primitive(p) => p.original_type(),
            Type::Group(g) => g.original_type(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_repeated(&self) -> bool {
        self.repetition() == Repetition::Repeated
    }

    /// Returns the primitive kind for leaf nodes, `None` for groups.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(p) => Some(p.kind()),
            Type::Group(_) => None,
        }
    }

    /// Views the node as a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is a primitive.
    pub fn as_group(&self) -> Result<&GroupType> {
        match self {
            Type::Group(g) => Ok(g),
            Type::Primitive(p) => Err(Error::invalid_arg(
                "type",
                format!("'{}' is a primitive, expected a group", p.name()),
            )),
        }
    }

    /// Views the node as a primitive.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is a group.
    pub fn as_primitive(&self) -> Result<&PrimitiveType> {
        match self {
            Type::Primitive(p) => Ok(p),
            Type::Group(g) => Err(Error::invalid_arg(
                "type",
                format!("'{}' is a group, expected a primitive", g.name()),
            )),
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Primitive(value)
    }
}

impl From<GroupType> for Type {
    fn from(value: GroupType) -> Self {
        Type::Group(value)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.repetition.as_str(), self.kind, self.name)?;
        if let Some(original_type) = self.original_type {
            write!(f, " ({})", original_type.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} group {}", self.repetition.as_str(), self.name)?;
        if let Some(original_type) = self.original_type {
            write!(f, " ({})", original_type.as_str())?;
        }
        write!(
            f,
            " {{ {} }}",
            self.fields.iter().map(|field| format!("{field};")).join(" ")
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => p.fmt(f),
            Type::Group(g) => g.fmt(f),
        }
    }
}

fn write_type(out: &mut String, ty: &Type, depth: usize) {
    let indent = "  ".repeat(depth);
    match ty {
        Type::Primitive(p) => {
            out.push_str(&format!("{indent}{p};\n"));
        }
        Type::Group(g) => {
            out.push_str(&format!("{indent}{} group {}", g.repetition.as_str(), g.name));
            if let Some(original_type) = g.original_type {
                out.push_str(&format!(" ({})", original_type.as_str()));
            }
            out.push_str(" {\n");
            for field in &g.fields {
                write_type(out, field, depth + 1);
            }
            out.push_str(&format!("{indent}}}\n"));
        }
    }
}
