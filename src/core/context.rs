//! The resolution façade over all configuration sources.

use super::builder::ContextBuilder;
use super::channels::{ChannelEntry, parse_channels};
use super::reporters::{ReporterSelection, parse_reporters};
use super::system::SystemDefaults;
use crate::error::{ContextError, FileParseError, Result, describe};
use crate::keys::canonical_key;
use crate::sources::ConfigSource;
use config::{Map, Value, ValueKind};
use serde::de::DeserializeOwned;
use std::fmt;

/// Name reported for the system defaults when a lookup fails.
const DEFAULTS_NAME: &str = "system defaults";

/// Read-only view over an ordered list of configuration sources.
///
/// Every read asks the sources in order (highest precedence first) and
/// returns the value of the first one that has the key; when none does, the
/// [`SystemDefaults`] answer. Sources are never merged with each other, so
/// reordering the list is the only way to change precedence.
///
/// A context is immutable once built. To pick up new files or defaults,
/// build a new one and swap it in through a
/// [`ContextHandle`](super::ContextHandle).
///
/// # Examples
///
/// ```rust
/// use condarc_context::prelude::*;
///
/// let context = Context::builder()
///     .with_args(ParsedArgs::new().set("quiet", true))
///     .with_env_vars([("CONDA_CHANNELS", "conda-forge,defaults")])
///     .build();
///
/// assert!(context.get_bool("quiet").unwrap());
/// assert_eq!(context.channel_names().unwrap(), ["conda-forge", "defaults"]);
/// ```
pub struct Context {
    sources: Vec<Box<dyn ConfigSource>>,
    system: SystemDefaults,
}

impl Context {
    /// Create a context from sources ordered highest precedence first.
    pub fn new(system: SystemDefaults, sources: Vec<Box<dyn ConfigSource>>) -> Self {
        tracing::debug!(
            sources = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "built configuration context"
        );
        Self { sources, system }
    }

    /// Create a builder wiring up the standard sources.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Whether any source or system default defines `key`.
    pub fn has(&self, key: &str) -> bool {
        let key = canonical_key(key);
        self.sources.iter().any(|s| s.has(key)) || self.system.has(key)
    }

    /// Resolve `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::KeyNotFound`] naming the key and the consulted
    /// sources when nothing defines it.
    pub fn get(&self, key: &str) -> Result<Value> {
        let canonical = canonical_key(key);
        if let Some(source) = self.sources.iter().find(|s| s.has(canonical)) {
            tracing::trace!(key, source = %source.name(), "resolved configuration key");
            return source.get(canonical);
        }

        if let Some(value) = self.system.get(canonical) {
            tracing::trace!(key, source = DEFAULTS_NAME, "resolved configuration key");
            return Ok(value.clone());
        }

        Err(ContextError::KeyNotFound {
            key: key.to_string(),
            consulted: self.source_names(),
        })
    }

    /// Name of the source that would answer `key`, if any.
    pub fn source_of(&self, key: &str) -> Option<String> {
        let key = canonical_key(key);
        match self.sources.iter().find(|s| s.has(key)) {
            Some(source) => Some(source.name()),
            None if self.system.has(key) => Some(DEFAULTS_NAME.to_string()),
            None => None,
        }
    }

    /// Resolve `key` as a boolean. Accepts `yes`/`no`/`on`/`off` strings.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)?
            .into_bool()
            .map_err(|e| ContextError::invalid_type(key, "a boolean", e))
    }

    /// Resolve `key` as an integer.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)?
            .into_int()
            .map_err(|e| ContextError::invalid_type(key, "an integer", e))
    }

    /// Resolve `key` as a string.
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)?
            .into_string()
            .map_err(|e| ContextError::invalid_type(key, "a string", e))
    }

    /// Resolve `key` as a sequence of strings.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>> {
        self.sequence(key)?
            .into_iter()
            .map(|item| {
                item.into_string()
                    .map_err(|e| ContextError::invalid_type(key, "a sequence of strings", e))
            })
            .collect()
    }

    /// Resolve `key` and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        T::deserialize(self.get(key)?)
            .map_err(|e| ContextError::invalid_type(key, std::any::type_name::<T>(), e))
    }

    /// Channel names in search order, duplicates kept.
    ///
    /// # Errors
    ///
    /// Fails with [`ContextError::MalformedChannelEntry`] if any entry is
    /// neither a bare name nor a single-key map.
    pub fn channel_names(&self) -> Result<Vec<String>> {
        Ok(self
            .channel_entries()?
            .into_iter()
            .map(|entry| match entry {
                ChannelEntry::Bare(name) | ChannelEntry::WithOptions { name, .. } => name,
            })
            .collect())
    }

    /// The raw channel sequence, names and option maps as written.
    pub fn channel_parameters(&self) -> Result<Vec<Value>> {
        self.sequence("channels")
    }

    /// The validated channel sequence.
    pub fn channel_entries(&self) -> Result<Vec<ChannelEntry>> {
        parse_channels(&self.channel_parameters()?)
    }

    /// Options declared for the first channel called `name`.
    ///
    /// Returns `Ok(None)` when the channel is absent or written as a bare name.
    pub fn channel_options(&self, name: &str) -> Result<Option<Map<String, Value>>> {
        Ok(self
            .channel_entries()?
            .into_iter()
            .find(|entry| entry.name() == name)
            .and_then(|entry| match entry {
                ChannelEntry::WithOptions { options, .. } => Some(options),
                ChannelEntry::Bare(_) => None,
            }))
    }

    /// Reporter backend/output selections in declaration order.
    pub fn reporters(&self) -> Result<Vec<ReporterSelection>> {
        parse_reporters(self.sequence("reporters")?)
    }

    /// Configuration files that failed to load, across all sources.
    pub fn diagnostics(&self) -> Vec<FileParseError> {
        self.sources
            .iter()
            .flat_map(|s| s.diagnostics().iter().cloned())
            .collect()
    }

    /// Names of the sources in precedence order, system defaults last.
    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(DEFAULTS_NAME.to_string()))
            .collect()
    }

    /// The system defaults consulted after every source.
    pub fn system_defaults(&self) -> &SystemDefaults {
        &self.system
    }

    fn sequence(&self, key: &str) -> Result<Vec<Value>> {
        let value = self.get(key)?;
        match value.kind {
            ValueKind::Array(items) => Ok(items),
            other => Err(ContextError::invalid_type(
                key,
                "a sequence",
                format!("found {}", describe(&other)),
            )),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("sources", &self.source_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{CliConfigSource, EnvConfigSource, ParsedArgs, SourceKind};

    struct MockSource {
        name: &'static str,
        values: Map<String, Value>,
    }

    impl MockSource {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                values: Map::new(),
            }
        }

        fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }
    }

    impl ConfigSource for MockSource {
        fn has(&self, key: &str) -> bool {
            self.values.contains_key(key)
        }

        fn get(&self, key: &str) -> Result<Value> {
            self.values.get(key).cloned().ok_or_else(|| ContextError::KeyNotFound {
                key: key.to_string(),
                consulted: vec![self.name()],
            })
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Custom
        }

        fn name(&self) -> String {
            self.name.to_string()
        }
    }

    fn defaults() -> SystemDefaults {
        SystemDefaults::new("linux", "x86_64", "base")
    }

    #[test]
    fn test_first_source_wins() {
        let context = Context::new(
            defaults(),
            vec![
                Box::new(MockSource::new("high").with_value("quiet", true)),
                Box::new(MockSource::new("low").with_value("quiet", false)),
            ],
        );
        assert!(context.get_bool("quiet").unwrap());
        assert_eq!(context.source_of("quiet").unwrap(), "high");
    }

    #[test]
    fn test_no_merging_between_sources() {
        let context = Context::new(
            defaults(),
            vec![
                Box::new(MockSource::new("high").with_value("channels", vec!["a"])),
                Box::new(MockSource::new("low").with_value("channels", vec!["b"])),
            ],
        );
        assert_eq!(context.channel_names().unwrap(), ["a"]);
    }

    #[test]
    fn test_falls_back_to_system_defaults() {
        let context = Context::new(defaults(), vec![Box::new(MockSource::new("empty"))]);
        assert_eq!(context.get_string("subdir").unwrap(), "linux-64");
        assert_eq!(context.channel_names().unwrap(), ["defaults"]);
        assert_eq!(context.source_of("subdir").unwrap(), DEFAULTS_NAME);
    }

    #[test]
    fn test_unknown_key() {
        let context = Context::new(defaults(), vec![Box::new(MockSource::new("empty"))]);
        let err = context.get("no_such_key").unwrap_err();
        assert_eq!(
            err,
            ContextError::KeyNotFound {
                key: "no_such_key".to_string(),
                consulted: vec!["empty".to_string(), DEFAULTS_NAME.to_string()],
            }
        );
        assert!(!context.has("no_such_key"));
        assert!(context.source_of("no_such_key").is_none());
    }

    #[test]
    fn test_unset_cli_flag_does_not_shadow() {
        let context = Context::new(
            defaults(),
            vec![
                Box::new(CliConfigSource::new(ParsedArgs::new().unset("offline"))),
                Box::new(EnvConfigSource::from_vars("CONDA", [("CONDA_OFFLINE", "yes")])),
            ],
        );
        assert!(context.get_bool("offline").unwrap());
    }

    #[test]
    fn test_invalid_type() {
        let context = Context::new(
            defaults(),
            vec![Box::new(MockSource::new("m").with_value("quiet", "maybe"))],
        );
        let err = context.get_bool("quiet").unwrap_err();
        assert!(matches!(err, ContextError::InvalidType { expected: "a boolean", .. }));
    }

    #[test]
    fn test_channels_must_be_sequence() {
        let context = Context::new(
            defaults(),
            vec![Box::new(MockSource::new("m").with_value("channels", "defaults"))],
        );
        let err = context.channel_names().unwrap_err();
        assert!(matches!(err, ContextError::InvalidType { ref key, .. } if key == "channels"));
    }

    #[test]
    fn test_reporters_default() {
        let context = Context::new(defaults(), Vec::new());
        let reporters = context.reporters().unwrap();
        assert_eq!(reporters.len(), 1);
        assert_eq!(reporters[0].backend, "console");
        assert_eq!(reporters[0].output, "stdout");
    }

    #[test]
    fn test_get_string_list_and_get_as() {
        let context = Context::new(
            defaults(),
            vec![Box::new(
                MockSource::new("m")
                    .with_value("pinned_packages", vec!["numpy", "scipy"])
                    .with_value("verbosity", 2i64),
            )],
        );
        assert_eq!(context.get_string_list("pinned_packages").unwrap(), ["numpy", "scipy"]);
        assert_eq!(context.get_int("verbosity").unwrap(), 2);
        let pinned: Vec<String> = context.get_as("pinned_packages").unwrap();
        assert_eq!(pinned, ["numpy", "scipy"]);
    }

    #[test]
    fn test_debug_lists_sources() {
        let context = Context::new(defaults(), vec![Box::new(MockSource::new("m"))]);
        assert_eq!(
            format!("{context:?}"),
            r#"Context { sources: ["m", "system defaults"] }"#
        );
    }

    #[test]
    fn test_alias_reaches_custom_sources() {
        let context = Context::new(
            defaults(),
            vec![Box::new(MockSource::new("plugin").with_value("always_yes", true))],
        );
        assert!(context.has("yes"));
        assert!(context.get_bool("yes").unwrap());
        assert_eq!(context.source_of("yes").unwrap(), "plugin");
    }
}
