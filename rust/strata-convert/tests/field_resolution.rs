use serde_json::json;
use strata_common::error::ErrorKind;
use strata_convert::MaterializerBuilder;
use strata_format::{
    schema::{PrimitiveKind, Repetition},
    schema_builder::{MessageBuilder, group, list, optional, required, string},
};
use strata_model::{
    Schema, Value,
    schema::{Field, RecordSchema},
};
use strata_testkit::events::EventScript;

#[test]
fn test_defaults_fill_fields_missing_from_data() {
    let schema = RecordSchema::new(
        "User",
        vec![
            Field::new("id", Schema::Long),
            Field::new("tags", Schema::array(Schema::String)).with_default(json!(["new"])),
            Field::new("level", Schema::Int).with_default(json!(1)),
            Field::new("nickname", Schema::nullable(Schema::String)).with_default(json!(null)),
        ],
    )
    .unwrap();
    let physical = MessageBuilder::new("user")
        .field(required(PrimitiveKind::Int64, "id"))
        .build();
    let mut materializer = MaterializerBuilder::new(schema)
        .with_physical_schema(physical)
        .build()
        .unwrap();

    let script = EventScript::new()
        .start_record()
        .long(0, 1)
        .end_record()
        .start_record()
        .long(0, 2)
        .end_record();
    let mut records = script.replay(&mut materializer).unwrap();
    assert_eq!(records.len(), 2);

    for (record, id) in records.iter().zip([1, 2]) {
        let record = record.as_record().unwrap();
        assert_eq!(record.get("id"), Some(&Value::Long(id)));
        assert_eq!(
            record.get("tags"),
            Some(&Value::Array(vec![Value::from("new")]))
        );
        assert_eq!(record.get("level"), Some(&Value::Int(1)));
        assert_eq!(record.get("nickname"), Some(&Value::Null));
    }

    // Defaults are copied into each record, never shared.
    if let Some(Value::Array(tags)) = records[0].as_record_mut().unwrap().get_mut("tags") {
        tags.push(Value::from("changed"));
    }
    let second = records[1].as_record().unwrap();
    assert_eq!(second.get("tags").and_then(Value::as_array).unwrap().len(), 1);
}

#[test]
fn test_aliases_and_ignored_fields() {
    let schema = RecordSchema::new(
        "Order",
        vec![
            Field::new("id", Schema::Long),
            Field::new("customer", Schema::String).with_aliases(["client", "buyer"]),
        ],
    )
    .unwrap();
    let physical = MessageBuilder::new("order")
        .field(required(PrimitiveKind::Int64, "id"))
        .field(group(
            Repetition::Optional,
            "audit",
            vec![
                required(PrimitiveKind::Int64, "ts"),
                list(
                    Repetition::Required,
                    "notes",
                    string(Repetition::Required, "element"),
                ),
            ],
        ))
        .field(string(Repetition::Required, "buyer"))
        .field(optional(PrimitiveKind::Double, "discount"))
        .build();
    let mut materializer = MaterializerBuilder::new(schema)
        .with_physical_schema(physical)
        .build()
        .unwrap();

    let script = EventScript::new()
        .start_record()
        .long(0, 7)
        .start_group(1)
        .long(0, 1_700_000_000)
        .start_group(1)
        .start_group(0)
        .text(0, "checked")
        .end_group()
        .end_group()
        .end_group()
        .text(2, "acme")
        .double(3, 0.1)
        .end_record();
    let records = script.replay(&mut materializer).unwrap();
    let record = records[0].as_record().unwrap();
    assert_eq!(record.values(), &[Value::Long(7), Value::from("acme")]);
}

#[test]
fn test_bind_errors() {
    let schema = RecordSchema::new("R", vec![Field::new("a", Schema::Int)]).unwrap();

    let wrong_kind = MessageBuilder::new("r")
        .field(string(Repetition::Required, "a"))
        .build();
    let err = MaterializerBuilder::new(schema.clone())
        .with_physical_schema(wrong_kind)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err.kind(), ErrorKind::UnsupportedConversion { .. }));

    let group_for_leaf = MessageBuilder::new("r")
        .field(group(
            Repetition::Required,
            "a",
            vec![required(PrimitiveKind::Int32, "x")],
        ))
        .build();
    assert!(
        MaterializerBuilder::new(schema)
            .with_physical_schema(group_for_leaf)
            .build()
            .err()
            .unwrap()
            .is_bind_error()
    );

    let nested = RecordSchema::new(
        "R",
        vec![Field::new("list", Schema::array(Schema::Int))],
    )
    .unwrap();
    let leaf_for_list = MessageBuilder::new("r")
        .field(required(PrimitiveKind::Int32, "list"))
        .build();
    assert!(
        MaterializerBuilder::new(nested)
            .with_physical_schema(leaf_for_list)
            .build()
            .is_err()
    );
}

#[test]
fn test_malformed_record_is_discarded() {
    let schema = RecordSchema::new(
        "R",
        vec![
            Field::new("a", Schema::Int),
            Field::new("b", Schema::array(Schema::Int)),
        ],
    )
    .unwrap();
    let mut materializer = MaterializerBuilder::new(schema).build().unwrap();

    let script = EventScript::new()
        .start_record()
        .int(0, 1)
        .start_group(1)
        .start_group(0)
        .text(0, "not an int")
        .end_group()
        .end_group()
        .end_record()
        .start_record()
        .int(0, 2)
        .end_group()
        .start_record()
        .int(0, 3)
        .start_group(1)
        .start_group(0)
        .int(0, 30)
        .end_group()
        .end_group()
        .end_record();
    let outcomes = script.replay_each(&mut materializer);
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcomes[0].as_ref().unwrap_err().kind(),
        ErrorKind::InvalidOperation { .. }
    ));
    assert!(outcomes[1].is_err());

    let last = outcomes[2].as_ref().unwrap().as_record().unwrap();
    assert_eq!(last.get("a"), Some(&Value::Int(3)));
    assert_eq!(
        last.get("b"),
        Some(&Value::Array(vec![Value::Int(30)]))
    );
}
