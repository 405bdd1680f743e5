//! Command-line argument configuration source.

use super::{ConfigSource, SourceKind};
use crate::error::{ContextError, Result};
use crate::keys::canonical_key;
use config::Value;
use std::collections::BTreeMap;

/// Arguments produced by the command-line front end.
///
/// Every flag the parser knows about may be recorded, but only flags the user
/// actually passed carry a value. A flag left at its default is stored as
/// `None`, the unset sentinel, so it never outranks files or environment.
/// Explicit falsy values (`--no-quiet` giving `false`, `--verbose 0`) are set.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    values: BTreeMap<String, Option<Value>>,
}

impl ParsedArgs {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a flag the user passed explicitly.
    ///
    /// Aliases are stored under their canonical key, so `yes` and
    /// `always_yes` name the same flag.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(canonical(key), Some(value.into()));
        self
    }

    /// Record a flag the parser knows about but the user did not pass.
    ///
    /// Never clears a value already set under either spelling.
    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.values.entry(canonical(key)).or_insert(None);
        self
    }

    /// Whether the parser defined `key` at all, set or not.
    pub fn is_defined(&self, key: &str) -> bool {
        self.values.contains_key(canonical_key(key))
    }

    /// The explicit value of `key`, if the user passed it.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(canonical_key(key)).and_then(Option::as_ref)
    }
}

fn canonical(key: impl Into<String>) -> String {
    let key = key.into();
    canonical_key(&key).to_string()
}

impl<K, V> FromIterator<(K, Option<V>)> for ParsedArgs
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |args, (key, value)| match value {
                Some(value) => args.set(key, value),
                None => args.unset(key),
            })
    }
}

/// Configuration source over [`ParsedArgs`].
///
/// # Examples
///
/// ```rust
/// use condarc_context::sources::{CliConfigSource, ConfigSource, ParsedArgs};
///
/// let args = ParsedArgs::new().set("quiet", true).unset("json");
/// let source = CliConfigSource::new(args);
///
/// assert!(source.has("quiet"));
/// assert!(!source.has("json"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CliConfigSource {
    args: ParsedArgs,
}

impl CliConfigSource {
    /// Wrap a parsed argument set.
    pub fn new(args: ParsedArgs) -> Self {
        Self { args }
    }

    /// The wrapped arguments.
    pub fn args(&self) -> &ParsedArgs {
        &self.args
    }
}

impl ConfigSource for CliConfigSource {
    fn has(&self, key: &str) -> bool {
        self.args.value(key).is_some()
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.args
            .value(key)
            .cloned()
            .ok_or_else(|| ContextError::KeyNotFound {
                key: key.to_string(),
                consulted: vec![self.name()],
            })
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Cli
    }
}
