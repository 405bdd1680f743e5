//! Environment variable configuration source.

use super::{ConfigSource, SourceKind};
use crate::error::{ContextError, Result};
use crate::keys::canonical_key;
use config::{Environment, Map, Source, Value, ValueKind};
use std::collections::{BTreeMap, HashMap};

/// Default prefix for configuration environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "CONDA";

/// Delimiter for path-like lists (`:` on Unix, `;` on Windows).
pub const PATH_LIST_DELIMITER: char = if cfg!(windows) { ';' } else { ':' };

/// Maps multi-valued keys to the delimiter their environment variable uses.
///
/// Keys not registered here are read as a single string.
#[derive(Debug, Clone)]
pub struct EnvKeyRegistry {
    delimiters: HashMap<String, char>,
}

impl EnvKeyRegistry {
    /// Create a registry with no multi-valued keys.
    pub fn empty() -> Self {
        Self {
            delimiters: HashMap::new(),
        }
    }

    /// Register `key` as multi-valued, split on `delimiter`.
    pub fn with_list(mut self, key: impl Into<String>, delimiter: char) -> Self {
        self.delimiters.insert(key.into(), delimiter);
        self
    }

    /// Delimiter for `key`, if it is multi-valued.
    pub fn delimiter(&self, key: &str) -> Option<char> {
        self.delimiters.get(key).copied()
    }
}

impl Default for EnvKeyRegistry {
    fn default() -> Self {
        Self::empty()
            .with_list("channels", ',')
            .with_list("default_channels", ',')
            .with_list("allowlist_channels", ',')
            .with_list("denylist_channels", ',')
            .with_list("create_default_packages", ',')
            .with_list("pinned_packages", '&')
            .with_list("envs_dirs", PATH_LIST_DELIMITER)
            .with_list("pkgs_dirs", PATH_LIST_DELIMITER)
    }
}

/// Environment variable configuration source.
///
/// Takes a snapshot of every variable starting with `<PREFIX>_` when it is
/// constructed; later changes to the process environment are not seen. Key
/// `pinned_packages` with prefix `CONDA` reads `CONDA_PINNED_PACKAGES`.
///
/// # Examples
///
/// ```rust
/// use condarc_context::sources::{ConfigSource, EnvConfigSource};
///
/// let source = EnvConfigSource::from_vars(
///     "CONDA",
///     [("CONDA_PINNED_PACKAGES", "test_1&test_2&test_3")],
/// );
/// let value = source.get("pinned_packages").unwrap();
/// let names: Vec<String> = value
///     .into_array()
///     .unwrap()
///     .into_iter()
///     .map(|v| v.into_string().unwrap())
///     .collect();
/// assert_eq!(names, ["test_1", "test_2", "test_3"]);
/// ```
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    prefix: String,
    snapshot: Map<String, String>,
    values: Map<String, Value>,
}

impl EnvConfigSource {
    /// Snapshot the process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn new(prefix: impl Into<String>) -> Self {
        let vars = std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        });
        Self::from_vars(prefix, vars)
    }

    /// Build the snapshot from an explicit set of variables.
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let prefix = prefix.into();
        let snapshot: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let values = collect_values(&prefix, &snapshot, &EnvKeyRegistry::default());

        tracing::debug!(prefix = %prefix, count = values.len(), "captured environment snapshot");

        Self {
            prefix,
            snapshot,
            values,
        }
    }

    /// Replace the multi-valued key registry.
    pub fn with_registry(mut self, registry: EnvKeyRegistry) -> Self {
        self.values = collect_values(&self.prefix, &self.snapshot, &registry);
        self
    }

    /// Name of the environment variable backing `key`.
    pub fn var_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, canonical_key(key).to_uppercase())
    }
}

fn environment(prefix: &str, snapshot: &Map<String, String>) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .source(Some(snapshot.clone()))
}

/// Read the prefixed variables out of `snapshot`.
///
/// Every key is first read as a plain string. Each registered delimiter then
/// gets its own pass that splits the keys using it.
fn collect_values(
    prefix: &str,
    snapshot: &Map<String, String>,
    registry: &EnvKeyRegistry,
) -> Map<String, Value> {
    let mut values = match environment(prefix, snapshot).collect() {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!(
                prefix = %prefix,
                error = %err,
                "failed to read environment variables"
            );
            return Map::new();
        }
    };

    let mut groups: BTreeMap<char, Vec<&str>> = BTreeMap::new();
    for (key, delimiter) in &registry.delimiters {
        if values.contains_key(key.as_str()) {
            groups.entry(*delimiter).or_default().push(key.as_str());
        }
    }

    for (delimiter, keys) in groups {
        let separator = delimiter.to_string();
        let lists = keys
            .iter()
            .fold(
                environment(prefix, snapshot)
                    .try_parsing(true)
                    .list_separator(&separator),
                |env, key| env.with_list_parse_key(key),
            )
            .collect();
        let mut lists = match lists {
            Ok(lists) => lists,
            Err(err) => {
                tracing::warn!(
                    prefix = %prefix,
                    delimiter = %separator,
                    error = %err,
                    "failed to split environment lists"
                );
                continue;
            }
        };

        for key in keys {
            if let Some(value) = lists.remove(key) {
                values.insert(key.to_string(), into_list(value));
            }
        }
    }

    values
}

/// Drop empty segments, and turn a value that parsed as a scalar (a single
/// numeric item) back into a one-item list.
fn into_list(value: Value) -> Value {
    let origin = value.origin().map(str::to_string);
    let items: Vec<Value> = match value.kind {
        ValueKind::Array(items) => items
            .into_iter()
            .filter(|item| !matches!(&item.kind, ValueKind::String(s) if s.is_empty()))
            .collect(),
        ValueKind::Nil => Vec::new(),
        other => vec![Value::new(origin.as_ref(), other.to_string())],
    };
    Value::new(origin.as_ref(), items)
}

impl ConfigSource for EnvConfigSource {
    fn has(&self, key: &str) -> bool {
        self.values.contains_key(canonical_key(key))
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.values
            .get(canonical_key(key))
            .cloned()
            .ok_or_else(|| ContextError::KeyNotFound {
                key: key.to_string(),
                consulted: vec![self.name()],
            })
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }

    fn name(&self) -> String {
        format!("env:{}_*", self.prefix)
    }
}
