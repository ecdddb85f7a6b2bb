use std::sync::Arc;

use strata_convert::{ConverterOptions, MaterializerBuilder, SchemaConverter};
use strata_format::schema::GroupType;
use strata_model::{
    Schema, Value,
    schema::{Field, RecordSchema},
};
use strata_testkit::{
    data_gen::{RecordGenerator, reading_schema},
    shred::shred_all,
};

#[test]
fn test_generated_records_round_trip() {
    let schema = reading_schema();
    let records = RecordGenerator::new(7).records(&schema, 200);
    let script = shred_all(&records, &schema, false).unwrap();

    let mut materializer = MaterializerBuilder::new(schema).build().unwrap();
    let materialized = script.replay(&mut materializer).unwrap();
    assert_eq!(materialized, records);
    assert_eq!(materializer.record_count(), 200);
}

#[test]
fn test_legacy_list_layout_round_trip() {
    let point = RecordSchema::new(
        "Point",
        vec![Field::new("x", Schema::Int), Field::new("y", Schema::Int)],
    )
    .unwrap();
    let schema = RecordSchema::new(
        "Track",
        vec![
            Field::new("scores", Schema::array(Schema::Long)),
            Field::new("points", Schema::array(Schema::Record(point))),
        ],
    )
    .unwrap();
    let options = ConverterOptions::new().with_legacy_lists(true);
    let records = RecordGenerator::new(11)
        .with_max_items(6)
        .records(&schema, 100);
    let script = shred_all(&records, &schema, true).unwrap();

    let mut materializer = MaterializerBuilder::new(schema.clone())
        .with_options(options)
        .build()
        .unwrap();
    assert_eq!(script.replay(&mut materializer).unwrap(), records);
}

#[test]
fn test_three_level_layout_read_with_explicit_schema() {
    let schema = RecordSchema::new(
        "Matrix",
        vec![Field::new(
            "rows",
            Schema::array(Schema::nullable(Schema::array(Schema::Double))),
        )],
    )
    .unwrap();
    let physical = SchemaConverter::new().convert(&schema).unwrap();
    let physical = GroupType::from_json(&physical.to_json_string(2).unwrap()).unwrap();

    let records = RecordGenerator::new(3).records(&schema, 50);
    let script = shred_all(&records, &schema, false).unwrap();
    let mut materializer = MaterializerBuilder::new(schema)
        .with_physical_schema(physical)
        .build()
        .unwrap();
    assert_eq!(script.replay(&mut materializer).unwrap(), records);
}

#[test]
fn test_nested_containers_round_trip() {
    let cell = RecordSchema::new(
        "Cell",
        vec![Field::new("v", Schema::nullable(Schema::String))],
    )
    .unwrap();
    let schema = RecordSchema::new(
        "Nested",
        vec![
            Field::new(
                "groups",
                Schema::array(Schema::map(Schema::array(Schema::Long))),
            ),
            Field::new(
                "lookup",
                Schema::map(Schema::array(Schema::Record(cell))),
            ),
        ],
    )
    .unwrap();
    let records = RecordGenerator::new(19)
        .with_max_items(4)
        .records(&schema, 60);
    let script = shred_all(&records, &schema, false).unwrap();

    let mut materializer = MaterializerBuilder::new(schema).build().unwrap();
    assert_eq!(script.replay(&mut materializer).unwrap(), records);
}

#[test]
fn test_same_seed_same_records() {
    let schema: Arc<RecordSchema> = reading_schema();
    let a = RecordGenerator::new(42).records(&schema, 10);
    let b = RecordGenerator::new(42).records(&schema, 10);
    assert_eq!(a, b);
    assert!(a.iter().all(|r| matches!(r, Value::Record(_))));
}
