//! The record materialization driver.
//!
//! A columnar reader reassembles each physical record as a stream of events:
//! `start_record`, nested `start_group`/`end_group` pairs addressing fields
//! by position within their enclosing group, primitive values for leaf
//! fields, and `end_record`. [`RecordMaterializer`] checks that stream and
//! routes every event to the converter that owns the addressed field.

use std::sync::Arc;

use log::{debug, trace};
use strata_common::{Result, error::Error};
use strata_format::schema::GroupType;
use strata_model::{Value, schema::RecordSchema};

use crate::{
    converter::{BindContext, GroupConverter},
    event::PrimitiveValue,
    record::RecordConverter,
    sink::{SlotSink, ValueSink},
};

/// Drives a bound converter tree, one record at a time.
///
/// The materializer keeps the path of open groups from the root record. A
/// malformed event invalidates the record in progress: everything up to the
/// next [`start_record`](Self::start_record) is rejected.
pub struct RecordMaterializer {
    root: GroupConverter,
    path: Vec<usize>,
    in_record: bool,
    records: u64,
}

impl RecordMaterializer {
    /// Binds the converter tree for the logical record `schema` over the
    /// physical message `physical`.
    ///
    /// # Errors
    ///
    /// Returns a bind error if the schemas cannot be paired.
    pub fn new(
        physical: &GroupType,
        schema: &Arc<RecordSchema>,
        ctx: &BindContext,
    ) -> Result<RecordMaterializer> {
        let root = RecordConverter::new(physical, schema, ctx)?;
        debug!(
            "bound record {} over message '{}' ({} physical fields)",
            schema.name(),
            physical.name(),
            root.field_count()
        );
        Ok(RecordMaterializer {
            root: GroupConverter::Record(root),
            path: Vec::new(),
            in_record: false,
            records: 0,
        })
    }

    /// Number of records completed so far.
    pub fn record_count(&self) -> u64 {
        self.records
    }

    /// Whether a record is in progress.
    pub fn is_in_record(&self) -> bool {
        self.in_record
    }

    /// Number of groups currently open below the root record.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Begins a new record. An unfinished record in progress is discarded.
    pub fn start_record(&mut self) -> Result<()> {
        if self.in_record {
            debug!("discarding an unfinished record at depth {}", self.path.len());
        }
        self.path.clear();
        self.in_record = false;
        self.guarded(|m| {
            m.root.start()?;
            m.in_record = true;
            Ok(())
        })
    }

    /// Opens the group field at `index` of the innermost open group.
    ///
    /// # Errors
    ///
    /// Returns an error if no record is in progress, if `index` is out of
    /// range, or if the field is not a group.
    pub fn start_group(&mut self, index: usize) -> Result<()> {
        self.guarded(|m| {
            m.open_group()?.child_group(index)?.start()?;
            m.path.push(index);
            Ok(())
        })
    }

    /// Closes the innermost open group, storing its value in its parent.
    pub fn end_group(&mut self) -> Result<()> {
        self.guarded(|m| {
            let index = m.path.pop().ok_or_else(|| {
                Error::invalid_operation("end_group without a matching start_group")
            })?;
            m.open_group()?.end_child(index)
        })
    }

    /// Delivers a value for the primitive field at `index` of the innermost
    /// open group.
    ///
    /// # Errors
    ///
    /// Returns an error if no record is in progress, if `index` is out of
    /// range, if the field is a group, or if the converter rejects the value.
    pub fn add(&mut self, index: usize, event: PrimitiveValue<'_>) -> Result<()> {
        self.guarded(|m| m.open_group()?.add_to_child(index, event))
    }

    pub fn add_boolean(&mut self, index: usize, value: bool) -> Result<()> {
        self.add(index, PrimitiveValue::Boolean(value))
    }

    pub fn add_int(&mut self, index: usize, value: i32) -> Result<()> {
        self.add(index, PrimitiveValue::Int(value))
    }

    pub fn add_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.add(index, PrimitiveValue::Long(value))
    }

    pub fn add_float(&mut self, index: usize, value: f32) -> Result<()> {
        self.add(index, PrimitiveValue::Float(value))
    }

    pub fn add_double(&mut self, index: usize, value: f64) -> Result<()> {
        self.add(index, PrimitiveValue::Double(value))
    }

    pub fn add_binary(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.add(index, PrimitiveValue::Binary(value))
    }

    /// Completes the record and hands it to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if no record is in progress or if groups are still
    /// open.
    pub fn end_record_into(&mut self, sink: &mut dyn ValueSink) -> Result<()> {
        self.guarded(|m| {
            if !m.path.is_empty() {
                return Err(Error::invalid_operation(format!(
                    "end_record with {} unclosed groups",
                    m.path.len()
                )));
            }
            m.in_record = false;
            m.root.end(sink)?;
            m.records += 1;
            trace!("materialized record #{}", m.records);
            Ok(())
        })
    }

    /// Completes the record and returns it.
    pub fn end_record(&mut self) -> Result<Value> {
        let mut slot = None;
        self.end_record_into(&mut SlotSink { slot: &mut slot })?;
        slot.ok_or_else(|| Error::invalid_operation("root converter produced no record"))
    }

    /// Runs one event, abandoning the record in progress if it fails.
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = f(self);
        if let Err(e) = &result {
            if self.in_record {
                debug!("abandoning record after error: {e}");
            }
            self.path.clear();
            self.in_record = false;
        }
        result
    }

    /// The innermost open group.
    fn open_group(&mut self) -> Result<&mut GroupConverter> {
        if !self.in_record {
            return Err(Error::invalid_operation("no record in progress"));
        }
        let mut group = &mut self.root;
        for &index in &self.path {
            group = group.child_group(index)?;
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use strata_format::{
        schema::{PrimitiveKind, Repetition},
        schema_builder::{MessageBuilder, group, required},
    };
    use strata_model::{
        GenericFactory, Schema,
        schema::{Field, RecordSchema},
    };

    use super::*;
    use crate::options::ConverterOptions;

    fn materializer() -> RecordMaterializer {
        let point = RecordSchema::new(
            "Point",
            vec![Field::new("x", Schema::Int), Field::new("y", Schema::Int)],
        )
        .unwrap();
        let schema = RecordSchema::new(
            "Shape",
            vec![
                Field::new("id", Schema::Long),
                Field::new("origin", Schema::Record(point)),
            ],
        )
        .unwrap();
        let physical = MessageBuilder::new("shape")
            .field(required(PrimitiveKind::Int64, "id"))
            .field(group(
                Repetition::Required,
                "origin",
                vec![
                    required(PrimitiveKind::Int32, "x"),
                    required(PrimitiveKind::Int32, "y"),
                ],
            ))
            .build();
        let options = ConverterOptions::default();
        RecordMaterializer::new(&physical, &schema, &BindContext::new(&GenericFactory, &options))
            .unwrap()
    }

    #[test]
    fn test_nested_record() {
        let mut m = materializer();
        m.start_record().unwrap();
        m.add_long(0, 1).unwrap();
        m.start_group(1).unwrap();
        assert_eq!(m.depth(), 1);
        m.add_int(0, 2).unwrap();
        m.add_int(1, 3).unwrap();
        m.end_group().unwrap();
        let value = m.end_record().unwrap();
        assert_eq!(m.record_count(), 1);

        let record = value.as_record().unwrap();
        assert_eq!(record.get("id"), Some(&Value::Long(1)));
        let origin = record.get("origin").and_then(Value::as_record).unwrap();
        assert_eq!(origin.values(), &[Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_protocol_violations() {
        let mut m = materializer();
        assert!(m.add_long(0, 1).is_err());
        assert!(m.end_record().is_err());

        m.start_record().unwrap();
        assert!(m.end_group().is_err());
        assert!(!m.is_in_record());

        m.start_record().unwrap();
        assert!(m.start_group(0).is_err());
        m.start_record().unwrap();
        assert!(m.add_int(1, 5).is_err());
        m.start_record().unwrap();
        assert!(m.add_long(2, 5).is_err());

        m.start_record().unwrap();
        m.start_group(1).unwrap();
        assert!(m.end_record().is_err());
        // The failed record is gone; later events need a fresh start.
        assert!(m.add_long(0, 1).is_err());
    }

    #[test]
    fn test_recovers_after_error() {
        let mut m = materializer();
        m.start_record().unwrap();
        assert!(m.add_binary(0, b"x").is_err());

        m.start_record().unwrap();
        m.add_long(0, 10).unwrap();
        let value = m.end_record().unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.get("id"), Some(&Value::Long(10)));
        assert_eq!(record.get("origin"), Some(&Value::Null));
    }
}
