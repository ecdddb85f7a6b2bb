use std::sync::Arc;

use crate::{
    factory::{ClassRegistry, EnumClass, GenericFactory, ObjectFactory},
    record::{GenericRecord, IndexedRecord},
    schema::{EnumSchema, Field, RecordSchema, Schema, SchemaKind},
    value::Value,
};

fn user_schema() -> Arc<RecordSchema> {
    RecordSchema::new(
        "example.User",
        vec![
            Field::new("id", Schema::Long),
            Field::new("name", Schema::nullable(Schema::String)).with_aliases(["full_name"]),
            Field::new("tags", Schema::array(Schema::String)),
        ],
    )
    .unwrap()
}

#[test]
fn test_record_schema_lookup() {
    let schema = user_schema();
    assert_eq!(schema.len(), 3);
    assert_eq!(schema.field("name").unwrap().pos(), 1);
    assert!(schema.field("full_name").is_none());
    assert!(schema.field_at(1).unwrap().has_alias("full_name"));
    assert_eq!(schema.field_at(2).unwrap().schema().kind(), SchemaKind::Array);
}

#[test]
fn test_duplicate_fields_rejected() {
    let res = RecordSchema::new(
        "Dup",
        vec![Field::new("a", Schema::Int), Field::new("a", Schema::Long)],
    );
    assert!(res.is_err());
    assert!(RecordSchema::new("", vec![]).is_err());
}

#[test]
fn test_non_null() {
    assert_eq!(Schema::nullable(Schema::Long).non_null(), &Schema::Long);
    assert_eq!(
        Schema::Union(vec![Schema::Int, Schema::Null]).non_null(),
        &Schema::Int
    );

    let wide = Schema::Union(vec![Schema::Null, Schema::Int, Schema::String]);
    assert_eq!(wide.non_null(), &wide);
    assert_eq!(wide.non_null_members().count(), 2);
    assert_eq!(Schema::Long.non_null_members().count(), 0);
}

#[test]
fn test_schema_display() {
    let schema = Schema::map(Schema::Union(vec![
        Schema::Null,
        Schema::array(Schema::Record(user_schema())),
    ]));
    assert_eq!(
        schema.to_string(),
        "map<string, union<null, array<record example.User>>>"
    );
}

#[test]
fn test_generic_record_access() {
    let mut record = GenericRecord::new(user_schema());
    assert_eq!(record.get("id"), Some(&Value::Null));

    record.set("id", 10_i64).unwrap();
    record.put(1, Value::from("ada")).unwrap();
    assert_eq!(record.get("id"), Some(&Value::Long(10)));
    assert_eq!(record.get_at(1).and_then(Value::as_str), Some("ada"));

    assert!(record.set("missing", 1).is_err());
    assert!(record.put(3, Value::Null).is_err());

    let value = Box::new(record.clone()).into_value();
    assert_eq!(value.as_record(), Some(&record));
}

#[derive(Debug, Clone, PartialEq)]
enum Suit {
    Hearts,
    Spades,
}

struct SuitClass;

impl EnumClass for SuitClass {
    fn name(&self) -> &str {
        "cards.Suit"
    }

    fn constant(&self, symbol: &str) -> Option<Value> {
        match symbol {
            "HEARTS" => Some(Value::specific(Suit::Hearts)),
            "SPADES" => Some(Value::specific(Suit::Spades)),
            _ => None,
        }
    }
}

#[test]
fn test_class_registry() {
    let suit = EnumSchema::new("cards.Suit", ["HEARTS", "SPADES"]);
    let other = EnumSchema::new("cards.Rank", ["ACE"]);

    let mut registry = ClassRegistry::new();
    registry.register_enum(Arc::new(SuitClass));
    assert_eq!(registry.len(), 1);

    let class = registry.enum_class(&suit).unwrap();
    let spades = class.constant("SPADES").unwrap();
    assert_eq!(spades.downcast_ref::<Suit>(), Some(&Suit::Spades));
    assert!(registry.enum_class(&other).is_none());
    assert!(GenericFactory.enum_class(&suit).is_none());
}

#[test]
fn test_specific_values_compare_and_clone() {
    let hearts = Value::specific(Suit::Hearts);
    let copy = hearts.clone();
    assert_eq!(hearts, copy);
    assert_ne!(hearts, Value::specific(Suit::Spades));
    assert_ne!(hearts, Value::Enum("HEARTS".into()));
    assert_ne!(hearts, Value::specific(String::from("HEARTS")));

    let mut value = Value::specific(Suit::Hearts);
    *value.downcast_mut::<Suit>().unwrap() = Suit::Spades;
    assert_eq!(value.downcast_ref::<Suit>(), Some(&Suit::Spades));
    assert_eq!(copy.downcast_ref::<Suit>(), Some(&Suit::Hearts));
}
