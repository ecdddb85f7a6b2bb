//! Converter configuration.

use serde::{Deserialize, Serialize};
use strata_common::{Result, error::Error};

/// How a map entry missing its key or its value is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapEntryPolicy {
    /// A missing value is stored as `null`; an entry without a key is dropped
    /// with a warning.
    #[default]
    Lenient,
    /// An entry without a key, or without a value for a non-nullable value
    /// type, fails the record.
    Strict,
}

/// Options controlling how converter trees are bound and how physical schemas
/// are derived.
///
/// Options are plain data and can be loaded from JSON:
///
/// ```json
/// { "map_entries": "strict", "legacy_lists": true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterOptions {
    map_entries: MapEntryPolicy,
    legacy_lists: bool,
}

impl ConverterOptions {
    pub fn new() -> ConverterOptions {
        ConverterOptions::default()
    }

    /// Sets the handling of incomplete map entries.
    pub fn with_map_entries(mut self, policy: MapEntryPolicy) -> Self {
        self.map_entries = policy;
        self
    }

    /// Derives two-level lists (`repeated <element> array`) instead of the
    /// three-level `list`/`element` layout.
    ///
    /// Only affects physical schema derivation; reading accepts both layouts
    /// regardless.
    pub fn with_legacy_lists(mut self, legacy_lists: bool) -> Self {
        self.legacy_lists = legacy_lists;
        self
    }

    pub fn map_entries(&self) -> MapEntryPolicy {
        self.map_entries
    }

    pub fn legacy_lists(&self) -> bool {
        self.legacy_lists
    }

    /// Parses options from their JSON form. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid options object.
    pub fn from_json(json: &str) -> Result<ConverterOptions> {
        serde_json::from_str(json).map_err(|e| Error::json("converter options", e))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::json("converter options", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json() {
        let options = ConverterOptions::from_json(r#"{ "map_entries": "strict" }"#).unwrap();
        assert_eq!(options.map_entries(), MapEntryPolicy::Strict);
        assert!(!options.legacy_lists());

        let options = ConverterOptions::from_json("{}").unwrap();
        assert_eq!(options, ConverterOptions::default());

        assert!(ConverterOptions::from_json(r#"{ "map_entries": "loose" }"#).is_err());
    }

    #[test]
    fn test_options_json_round_trip() {
        let options = ConverterOptions::new()
            .with_map_entries(MapEntryPolicy::Strict)
            .with_legacy_lists(true);
        let json = options.to_json_string().unwrap();
        assert_eq!(ConverterOptions::from_json(&json).unwrap(), options);
    }
}
