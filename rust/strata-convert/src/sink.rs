//! Value sinks: the single capability through which a converter hands a
//! completed value to its parent.
//!
//! A composite converter owns the value it is assembling. When one of its
//! children completes, the composite lends a short-lived sink borrowing the
//! exact slot the child writes to: a record field, the tail of an array, an
//! element slot or a union's held member. Children never hold a reference to
//! their parent.

use strata_common::{Result, error::Error};
use strata_model::{IndexedRecord, Value};

/// Receives completed values.
pub trait ValueSink {
    /// Delivers one completed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiving slot rejects the value.
    fn add(&mut self, value: Value) -> Result<()>;
}

impl<F> ValueSink for F
where
    F: FnMut(Value) -> Result<()>,
{
    fn add(&mut self, value: Value) -> Result<()> {
        self(value)
    }
}

/// Stores into one field of a record under construction.
pub(crate) struct RecordFieldSink<'a> {
    pub record: &'a mut dyn IndexedRecord,
    pub pos: usize,
}

impl ValueSink for RecordFieldSink<'_> {
    fn add(&mut self, value: Value) -> Result<()> {
        self.record.put(self.pos, value)
    }
}

/// Appends to an array under construction.
pub(crate) struct AppendSink<'a> {
    pub items: &'a mut Vec<Value>,
}

impl ValueSink for AppendSink<'_> {
    fn add(&mut self, value: Value) -> Result<()> {
        self.items.push(value);
        Ok(())
    }
}

/// Replaces the content of a single slot.
pub(crate) struct SlotSink<'a> {
    pub slot: &'a mut Option<Value>,
}

impl ValueSink for SlotSink<'_> {
    fn add(&mut self, value: Value) -> Result<()> {
        *self.slot = Some(value);
        Ok(())
    }
}

/// Holds the single resolved member of a union occurrence.
pub(crate) struct UnionMemberSink<'a> {
    pub held: &'a mut Option<Value>,
    pub union: &'a str,
}

impl ValueSink for UnionMemberSink<'_> {
    fn add(&mut self, value: Value) -> Result<()> {
        if self.held.is_some() {
            return Err(Error::union_conflict(self.union));
        }
        *self.held = Some(value);
        Ok(())
    }
}

/// Drops everything; used for physical fields with no logical counterpart.
pub(crate) struct DiscardSink;

impl ValueSink for DiscardSink {
    fn add(&mut self, _value: Value) -> Result<()> {
        Ok(())
    }
}
