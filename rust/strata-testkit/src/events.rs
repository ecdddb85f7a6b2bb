//! Recorded decode event streams.

use serde::{Deserialize, Serialize};
use strata_convert::RecordMaterializer;
use strata_model::Value;

/// One decode event, as a columnar reader emits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    StartRecord,
    StartGroup { index: usize },
    EndGroup,
    Boolean { index: usize, value: bool },
    Int { index: usize, value: i32 },
    Long { index: usize, value: i64 },
    Float { index: usize, value: f32 },
    Double { index: usize, value: f64 },
    Binary { index: usize, value: Vec<u8> },
    /// UTF-8 text delivered as a binary event.
    Text { index: usize, value: String },
    EndRecord,
}

/// A sequence of decode events.
///
/// Scripts are built fluently:
///
/// ```
/// use strata_testkit::events::EventScript;
///
/// let script = EventScript::new()
///     .start_record()
///     .long(0, 1)
///     .start_group(1)
///     .text(0, "x")
///     .end_group()
///     .end_record();
/// assert_eq!(script.len(), 6);
/// ```
///
/// or loaded from their JSON form, an array of objects tagged by `event`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventScript {
    events: Vec<Event>,
}

impl EventScript {
    pub fn new() -> EventScript {
        EventScript::default()
    }

    pub fn from_json(json: &str) -> anyhow::Result<EventScript> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Appends all events of another script.
    pub fn extend(&mut self, other: EventScript) {
        self.events.extend(other.events);
    }

    pub fn start_record(self) -> Self {
        self.with(Event::StartRecord)
    }

    pub fn start_group(self, index: usize) -> Self {
        self.with(Event::StartGroup { index })
    }

    pub fn end_group(self) -> Self {
        self.with(Event::EndGroup)
    }

    pub fn boolean(self, index: usize, value: bool) -> Self {
        self.with(Event::Boolean { index, value })
    }

    pub fn int(self, index: usize, value: i32) -> Self {
        self.with(Event::Int { index, value })
    }

    pub fn long(self, index: usize, value: i64) -> Self {
        self.with(Event::Long { index, value })
    }

    pub fn float(self, index: usize, value: f32) -> Self {
        self.with(Event::Float { index, value })
    }

    pub fn double(self, index: usize, value: f64) -> Self {
        self.with(Event::Double { index, value })
    }

    pub fn binary(self, index: usize, value: impl Into<Vec<u8>>) -> Self {
        self.with(Event::Binary {
            index,
            value: value.into(),
        })
    }

    pub fn text(self, index: usize, value: impl Into<String>) -> Self {
        self.with(Event::Text {
            index,
            value: value.into(),
        })
    }

    pub fn end_record(self) -> Self {
        self.with(Event::EndRecord)
    }

    /// Replays the script, returning the completed records.
    ///
    /// Stops at the first event the materializer rejects.
    pub fn replay(&self, materializer: &mut RecordMaterializer) -> strata_common::Result<Vec<Value>> {
        let mut records = Vec::new();
        for event in &self.events {
            if let Some(record) = apply(materializer, event)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Replays the script, returning one outcome per record.
    ///
    /// A rejected event fails its record; replay resumes at the next
    /// `StartRecord`.
    pub fn replay_each(
        &self,
        materializer: &mut RecordMaterializer,
    ) -> Vec<strata_common::Result<Value>> {
        let mut outcomes = Vec::new();
        let mut failed = false;
        for event in &self.events {
            if matches!(event, Event::StartRecord) {
                failed = false;
            } else if failed {
                continue;
            }
            match apply(materializer, event) {
                Ok(Some(record)) => outcomes.push(Ok(record)),
                Ok(None) => (),
                Err(e) => {
                    outcomes.push(Err(e));
                    failed = true;
                }
            }
        }
        outcomes
    }

    fn with(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }
}

fn apply(
    materializer: &mut RecordMaterializer,
    event: &Event,
) -> strata_common::Result<Option<Value>> {
    match event {
        Event::StartRecord => materializer.start_record()?,
        Event::StartGroup { index } => materializer.start_group(*index)?,
        Event::EndGroup => materializer.end_group()?,
        Event::Boolean { index, value } => materializer.add_boolean(*index, *value)?,
        Event::Int { index, value } => materializer.add_int(*index, *value)?,
        Event::Long { index, value } => materializer.add_long(*index, *value)?,
        Event::Float { index, value } => materializer.add_float(*index, *value)?,
        Event::Double { index, value } => materializer.add_double(*index, *value)?,
        Event::Binary { index, value } => materializer.add_binary(*index, value)?,
        Event::Text { index, value } => materializer.add_binary(*index, value.as_bytes())?,
        Event::EndRecord => return materializer.end_record().map(Some),
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_json() {
        let script = EventScript::new()
            .start_record()
            .int(0, 3)
            .text(1, "hi")
            .end_record();
        let json = script.to_json().unwrap();
        assert!(json.contains(r#""event": "start_record""#));
        assert_eq!(EventScript::from_json(&json).unwrap(), script);

        let parsed = EventScript::from_json(
            r#"[{"event": "start_group", "index": 2}, {"event": "end_group"}]"#,
        )
        .unwrap();
        assert_eq!(parsed, EventScript::new().start_group(2).end_group());
    }
}
