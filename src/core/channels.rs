//! Channel list normalization.
//!
//! A `channels` setting mixes bare names and single-key option maps:
//!
//! ```yaml
//! channels:
//!   - defaults
//!   - http://localhost:
//!       fetch_type: blah
//! ```

use crate::error::{ContextError, Result, describe};
use config::{Map, Value, ValueKind};

/// One validated entry of a channel list.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEntry {
    /// A plain channel name.
    Bare(String),
    /// A channel name with per-channel options.
    WithOptions {
        /// The channel name (the map's single key)
        name: String,
        /// Options declared for the channel
        options: Map<String, Value>,
    },
}

impl ChannelEntry {
    /// Validate the entry at `position` of a channel list.
    ///
    /// Map entries must have exactly one key; the entry is rejected otherwise
    /// rather than picking one of the keys.
    pub fn parse(position: usize, value: &Value) -> Result<Self> {
        let malformed = |reason: String| ContextError::MalformedChannelEntry { position, reason };

        match &value.kind {
            ValueKind::String(name) if name.is_empty() => {
                Err(malformed("channel name is empty".to_string()))
            }
            ValueKind::String(name) => Ok(Self::Bare(name.clone())),
            ValueKind::Table(table) => {
                if table.len() != 1 {
                    return Err(malformed(format!(
                        "a channel map must have exactly one key, found {}",
                        table.len()
                    )));
                }
                let Some((name, options)) = table.iter().next() else {
                    return Err(malformed(
                        "a channel map must have exactly one key, found 0".to_string(),
                    ));
                };
                let options = match &options.kind {
                    ValueKind::Table(options) => options.clone(),
                    ValueKind::Nil => Map::new(),
                    other => {
                        return Err(malformed(format!(
                            "options for channel '{name}' must be a map, found {}",
                            describe(other)
                        )));
                    }
                };
                Ok(Self::WithOptions {
                    name: name.clone(),
                    options,
                })
            }
            other => Err(malformed(format!(
                "expected a channel name or a single-key map, found {}",
                describe(other)
            ))),
        }
    }

    /// The channel name.
    pub fn name(&self) -> &str {
        match self {
            Self::Bare(name) | Self::WithOptions { name, .. } => name,
        }
    }

    /// Declared options, if the entry was written in map form.
    pub fn options(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Bare(_) => None,
            Self::WithOptions { options, .. } => Some(options),
        }
    }
}

/// Validate every entry of a raw channel sequence, keeping order and duplicates.
pub fn parse_channels(entries: &[Value]) -> Result<Vec<ChannelEntry>> {
    entries
        .iter()
        .enumerate()
        .map(|(position, value)| ChannelEntry::parse(position, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_options(name: &str, options: &[(&str, &str)]) -> Value {
        let options: Map<String, Value> = options
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect();
        let mut entry = Map::new();
        entry.insert(name.to_string(), Value::from(options));
        Value::from(entry)
    }

    #[test]
    fn test_bare_entry() {
        let entry = ChannelEntry::parse(0, &Value::from("defaults")).unwrap();
        assert_eq!(entry, ChannelEntry::Bare("defaults".to_string()));
        assert_eq!(entry.name(), "defaults");
        assert!(entry.options().is_none());
    }

    #[test]
    fn test_single_key_map() {
        let value = with_options("http://localhost", &[("fetch_type", "blah")]);
        let entry = ChannelEntry::parse(1, &value).unwrap();
        assert_eq!(entry.name(), "http://localhost");
        let options = entry.options().unwrap();
        assert_eq!(options["fetch_type"].clone().into_string().unwrap(), "blah");
    }

    #[test]
    fn test_map_with_null_options() {
        let mut entry = Map::new();
        entry.insert("conda-forge".to_string(), Value::new(None, ValueKind::Nil));
        let entry = ChannelEntry::parse(0, &Value::from(entry)).unwrap();
        assert_eq!(entry.name(), "conda-forge");
        assert!(entry.options().unwrap().is_empty());
    }

    #[test]
    fn test_multi_key_map_rejected() {
        let mut entry = Map::new();
        entry.insert("a".to_string(), Value::from(Map::<String, Value>::new()));
        entry.insert("b".to_string(), Value::from(Map::<String, Value>::new()));
        let err = ChannelEntry::parse(3, &Value::from(entry)).unwrap_err();
        assert!(matches!(err, ContextError::MalformedChannelEntry { position: 3, .. }));
    }

    #[test]
    fn test_empty_map_rejected() {
        let err = ChannelEntry::parse(0, &Value::from(Map::<String, Value>::new())).unwrap_err();
        assert!(matches!(err, ContextError::MalformedChannelEntry { position: 0, .. }));
    }

    #[test]
    fn test_non_map_options_rejected() {
        let mut entry = Map::new();
        entry.insert("conda-forge".to_string(), Value::from("oops"));
        let err = ChannelEntry::parse(0, &Value::from(entry)).unwrap_err();
        assert!(err.to_string().contains("must be a map"));
    }

    #[test]
    fn test_scalar_rejected() {
        let err = ChannelEntry::parse(2, &Value::from(42i64)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed channel entry at position 2: expected a channel name or a single-key map, found an integer"
        );
    }

    #[test]
    fn test_parse_channels_preserves_order_and_duplicates() {
        let entries = vec![
            Value::from("defaults"),
            with_options("http://localhost", &[]),
            Value::from("defaults"),
        ];
        let names: Vec<String> = parse_channels(&entries)
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, ["defaults", "http://localhost", "defaults"]);
    }
}
