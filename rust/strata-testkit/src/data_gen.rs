//! Data generation utilities for testing.
//!
//! This module provides seeded generation of logical records for any record
//! schema, along with a sample schema covering every logical kind.

use std::sync::Arc;

use strata_model::{
    GenericRecord, Schema, Value,
    schema::{EnumSchema, Field, FixedSchema, RecordSchema},
};

/// A "sensor reading" record exercising every logical kind:
///
/// ```text
/// record testkit.Reading {
///   id: long
///   active: boolean
///   name: union<null, string>
///   score: float
///   tags: array<string>
///   samples: array<union<null, double>>
///   attrs: map<string, long>
///   payload: union<null, int, string>
///   location: union<null, record testkit.Location { lat: double, lon: double }>
///   unit: enum testkit.Unit { CELSIUS, KELVIN }
///   checksum: fixed testkit.Checksum(4)
///   raw: bytes
///   count: int
/// }
/// ```
pub fn reading_schema() -> Arc<RecordSchema> {
    let location = RecordSchema::new(
        "testkit.Location",
        vec![
            Field::new("lat", Schema::Double),
            Field::new("lon", Schema::Double),
        ],
    )
    .expect("valid location schema");
    RecordSchema::new(
        "testkit.Reading",
        vec![
            Field::new("id", Schema::Long),
            Field::new("active", Schema::Boolean),
            Field::new("name", Schema::nullable(Schema::String)),
            Field::new("score", Schema::Float),
            Field::new("tags", Schema::array(Schema::String)),
            Field::new("samples", Schema::array(Schema::nullable(Schema::Double))),
            Field::new("attrs", Schema::map(Schema::Long)),
            Field::new(
                "payload",
                Schema::Union(vec![Schema::Null, Schema::Int, Schema::String]),
            ),
            Field::new("location", Schema::nullable(Schema::Record(location))),
            Field::new(
                "unit",
                Schema::Enum(EnumSchema::new("testkit.Unit", ["CELSIUS", "KELVIN"])),
            ),
            Field::new(
                "checksum",
                Schema::Fixed(FixedSchema::new("testkit.Checksum", 4)),
            ),
            Field::new("raw", Schema::Bytes),
            Field::new("count", Schema::Int),
        ],
    )
    .expect("valid reading schema")
}

/// Generates random values conforming to a logical schema.
pub struct RecordGenerator {
    rng: fastrand::Rng,
    max_items: usize,
}

impl RecordGenerator {
    /// Creates a generator; equal seeds produce equal sequences.
    pub fn new(seed: u64) -> RecordGenerator {
        RecordGenerator {
            rng: fastrand::Rng::with_seed(seed),
            max_items: 4,
        }
    }

    /// Sets the maximum number of items in generated arrays, maps, strings
    /// and byte arrays.
    pub fn with_max_items(self, max_items: usize) -> Self {
        Self { max_items, ..self }
    }

    /// Generates one record.
    pub fn record(&mut self, schema: &Arc<RecordSchema>) -> Value {
        let mut record = GenericRecord::new(schema.clone());
        for field in schema.fields() {
            if let Some(slot) = record.get_mut(field.name()) {
                *slot = self.value(field.schema());
            }
        }
        Value::Record(record)
    }

    /// Generates `count` records.
    pub fn records(&mut self, schema: &Arc<RecordSchema>, count: usize) -> Vec<Value> {
        (0..count).map(|_| self.record(schema)).collect()
    }

    pub fn value(&mut self, schema: &Schema) -> Value {
        match schema {
            Schema::Null => Value::Null,
            Schema::Boolean => Value::Boolean(self.rng.bool()),
            Schema::Int => Value::Int(self.rng.i32(..)),
            Schema::Long => Value::Long(self.rng.i64(..)),
            // Bounded, finite floats so generated values compare equal to themselves.
            Schema::Float => Value::Float((self.rng.f32() - 0.5) * 1e4),
            Schema::Double => Value::Double((self.rng.f64() - 0.5) * 1e9),
            Schema::Bytes => {
                let len = self.rng.usize(..=self.max_items);
                Value::Bytes(self.bytes(len))
            }
            Schema::String => Value::String(self.text()),
            Schema::Enum(e) => {
                let symbols = e.symbols();
                Value::Enum(symbols[self.rng.usize(..symbols.len())].clone())
            }
            Schema::Fixed(f) => Value::Fixed(self.bytes(f.size())),
            Schema::Record(r) => self.record(r),
            Schema::Array(element) => {
                let len = self.rng.usize(..=self.max_items);
                Value::Array((0..len).map(|_| self.value(element)).collect())
            }
            Schema::Map(value) => {
                let len = self.rng.usize(..=self.max_items);
                Value::Map(
                    (0..len)
                        .map(|i| (format!("key{i}"), self.value(value)))
                        .collect(),
                )
            }
            Schema::Union(members) => {
                let member = &members[self.rng.usize(..members.len())];
                self.value(member)
            }
        }
    }

    fn bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.rng.u8(..)).collect()
    }

    fn text(&mut self) -> String {
        let len = self.rng.usize(..=self.max_items);
        (0..len).map(|_| self.rng.alphanumeric()).collect()
    }
}
