use crate::schema::{GroupType, OriginalType, PrimitiveKind, PrimitiveType, Repetition, Type};

/// A builder for the root group of a physical record layout.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    name: String,
    fields: Vec<Type>,
}

impl MessageBuilder {
    /// Creates a new `MessageBuilder`, initially empty.
    pub fn new(name: impl Into<String>) -> MessageBuilder {
        MessageBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field to the message.
    ///
    /// # Panics
    ///
    /// Panics if the field name is empty or if a field with the same name already exists.
    pub fn add_field(&mut self, field: impl Into<Type>) {
        let field = field.into();
        assert!(!field.name().is_empty());
        assert!(self.fields.iter().all(|f| f.name() != field.name()));
        self.fields.push(field);
    }

    pub fn field(mut self, field: impl Into<Type>) -> MessageBuilder {
        self.add_field(field);
        self
    }

    /// Returns a slice of the fields added so far.
    pub fn fields(&self) -> &[Type] {
        &self.fields
    }

    /// Finishes building the message.
    pub fn build(self) -> GroupType {
        GroupType::new_message(self.name, self.fields)
    }
}

pub fn required(kind: PrimitiveKind, name: impl Into<String>) -> Type {
    PrimitiveType::new(name, Repetition::Required, kind).into()
}

pub fn optional(kind: PrimitiveKind, name: impl Into<String>) -> Type {
    PrimitiveType::new(name, Repetition::Optional, kind).into()
}

pub fn repeated(kind: PrimitiveKind, name: impl Into<String>) -> Type {
    PrimitiveType::new(name, Repetition::Repeated, kind).into()
}

/// A UTF-8 annotated binary leaf.
pub fn string(repetition: Repetition, name: impl Into<String>) -> Type {
    PrimitiveType::new(name, repetition, PrimitiveKind::Binary)
        .with_original_type(OriginalType::Utf8)
        .into()
}

/// An enum annotated binary leaf.
pub fn enum_symbol(repetition: Repetition, name: impl Into<String>) -> Type {
    PrimitiveType::new(name, repetition, PrimitiveKind::Binary)
        .with_original_type(OriginalType::Enum)
        .into()
}

pub fn group(repetition: Repetition, name: impl Into<String>, fields: Vec<Type>) -> Type {
    GroupType::new(name, repetition, fields).into()
}

/// Standard three-level list layout:
///
/// ```text
/// <repetition> group <name> (LIST) {
///   repeated group list {
///     <element>;
///   }
/// }
/// ```
///
/// The element is expected to be named `element`.
pub fn list(repetition: Repetition, name: impl Into<String>, element: Type) -> Type {
    GroupType::new(
        name,
        repetition,
        vec![GroupType::new("list", Repetition::Repeated, vec![element]).into()],
    )
    .with_original_type(OriginalType::List)
    .into()
}

/// Legacy two-level list layout, where the repeated child is the element itself:
///
/// ```text
/// <repetition> group <name> (LIST) {
///   repeated <element> array;
/// }
/// ```
///
/// # Panics
///
/// Panics if `element` is not repeated.
pub fn legacy_list(repetition: Repetition, name: impl Into<String>, element: Type) -> Type {
    assert!(element.is_repeated());
    GroupType::new(name, repetition, vec![element])
        .with_original_type(OriginalType::List)
        .into()
}

/// Map layout with a repeated `key_value` group holding a required UTF-8 `key`
/// and the given value.
pub fn map(repetition: Repetition, name: impl Into<String>, value: Type) -> Type {
    let key_value = GroupType::new(
        "key_value",
        Repetition::Repeated,
        vec![string(Repetition::Required, "key"), value],
    )
    .with_original_type(OriginalType::MapKeyValue);
    GroupType::new(name, repetition, vec![key_value.into()])
        .with_original_type(OriginalType::Map)
        .into()
}
