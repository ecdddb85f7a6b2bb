use strata_common::error::ErrorKind;
use strata_convert::{MaterializerBuilder, legacy_timestamp::encode_micros};
use strata_format::{schema::PrimitiveKind, schema_builder::{MessageBuilder, optional}};
use strata_model::{
    Schema, Value,
    schema::{Field, RecordSchema},
};
use strata_testkit::events::EventScript;

fn int96(nanos_of_day: i64, julian_day: i32) -> Vec<u8> {
    let mut bytes = nanos_of_day.to_le_bytes().to_vec();
    bytes.extend_from_slice(&julian_day.to_le_bytes());
    bytes
}

fn materialize(logical: Schema, payload: Vec<u8>) -> strata_common::Result<Value> {
    let schema = RecordSchema::new("Log", vec![Field::new("ts", logical)]).unwrap();
    let physical = MessageBuilder::new("log")
        .field(optional(PrimitiveKind::Int96, "ts"))
        .build();
    let mut materializer = MaterializerBuilder::new(schema)
        .with_physical_schema(physical)
        .build()?;
    let records = EventScript::new()
        .start_record()
        .binary(0, payload)
        .end_record()
        .replay(&mut materializer)?;
    Ok(records[0].as_record().unwrap().get("ts").unwrap().clone())
}

#[test]
fn test_int96_as_micros() {
    assert_eq!(
        materialize(Schema::Long, int96(0, 2_440_588)).unwrap(),
        Value::Long(0)
    );
    assert_eq!(
        materialize(Schema::nullable(Schema::Long), int96(1_000_000, 2_440_589)).unwrap(),
        Value::Long(86_400_001_000)
    );
    assert_eq!(
        materialize(Schema::Long, encode_micros(1_234_567).to_vec()).unwrap(),
        Value::Long(1_234_567)
    );
}

#[test]
fn test_int96_as_bytes() {
    let raw = int96(5, 2_440_600);
    assert_eq!(
        materialize(Schema::Bytes, raw.clone()).unwrap(),
        Value::Bytes(raw)
    );
}

#[test]
fn test_int96_wrong_length() {
    let err = materialize(Schema::Long, vec![0; 8]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
}

#[test]
fn test_int96_other_targets() {
    for logical in [Schema::String, Schema::Int, Schema::Double] {
        let err = materialize(logical, int96(0, 2_440_588)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedConversion { .. }));
    }
}
