//! Built-in defaults and platform facts.

use crate::keys::canonical_key;
use config::{Map, Value};

/// Name of the environment variable naming the active environment.
pub const ACTIVE_ENV_VAR: &str = "CONDA_DEFAULT_ENV";

/// Fallback values consulted after every configuration source.
///
/// Holds static defaults (`channels: [defaults]`, the console reporter, ...)
/// and facts derived from the running system (`platform`, `subdir`,
/// `active_env_name`). Collaborators such as plugins may register further
/// defaults with [`with_value`](Self::with_value) before a context is built.
#[derive(Debug, Clone)]
pub struct SystemDefaults {
    values: Map<String, Value>,
}

impl SystemDefaults {
    /// Defaults for an explicit OS/architecture pair and environment name.
    ///
    /// `os` and `arch` use the spelling of [`std::env::consts`].
    pub fn new(os: &str, arch: &str, active_env_name: impl Into<String>) -> Self {
        let platform = platform_name(os);
        let subdir = subdir(os, arch);

        let mut values = static_defaults();
        values.insert("platform".to_string(), Value::from(platform));
        values.insert("subdir".to_string(), Value::from(subdir));
        values.insert(
            "active_env_name".to_string(),
            Value::from(active_env_name.into()),
        );

        Self { values }
    }

    /// Defaults for the running process.
    pub fn detect() -> Self {
        let active = std::env::var(ACTIVE_ENV_VAR)
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "base".to_string());
        Self::new(std::env::consts::OS, std::env::consts::ARCH, active)
    }

    /// Register or replace a default.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let key = canonical_key(&key).to_string();
        self.values.insert(key, value.into());
        self
    }

    /// Whether a default exists for `key`.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(canonical_key(key))
    }

    /// The default for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(canonical_key(key))
    }

    /// All keys with a default.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl Default for SystemDefaults {
    fn default() -> Self {
        Self::detect()
    }
}

fn static_defaults() -> Map<String, Value> {
    let mut console = Map::new();
    console.insert("backend".to_string(), Value::from("console"));
    console.insert("output".to_string(), Value::from("stdout"));

    let mut values = Map::new();
    values.insert("channels".to_string(), Value::from(vec!["defaults"]));
    values.insert("always_yes".to_string(), Value::from(false));
    values.insert("auto_activate".to_string(), Value::from(true));
    values.insert("changeps1".to_string(), Value::from(true));
    values.insert("json".to_string(), Value::from(false));
    values.insert("quiet".to_string(), Value::from(false));
    values.insert("offline".to_string(), Value::from(false));
    values.insert("verbosity".to_string(), Value::from(0i64));
    values.insert("reporters".to_string(), Value::from(vec![Value::from(console)]));
    values
}

/// Platform component of a subdir (`linux`, `osx`, `win`).
pub fn platform_name(os: &str) -> String {
    match os {
        "macos" => "osx".to_string(),
        "windows" => "win".to_string(),
        other => other.to_string(),
    }
}

/// Package subdirectory for an OS/architecture pair, e.g. `linux-64`.
pub fn subdir(os: &str, arch: &str) -> String {
    let platform = platform_name(os);
    let arch = match (os, arch) {
        (_, "x86_64") => "64",
        (_, "x86") => "32",
        ("macos" | "windows", "aarch64") => "arm64",
        (_, "aarch64") => "aarch64",
        (_, "powerpc64") => "ppc64le",
        (_, "arm") => "armv7l",
        (_, other) => other,
    };
    format!("{platform}-{arch}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdirs() {
        assert_eq!(subdir("linux", "x86_64"), "linux-64");
        assert_eq!(subdir("linux", "aarch64"), "linux-aarch64");
        assert_eq!(subdir("linux", "powerpc64"), "linux-ppc64le");
        assert_eq!(subdir("macos", "aarch64"), "osx-arm64");
        assert_eq!(subdir("macos", "x86_64"), "osx-64");
        assert_eq!(subdir("windows", "x86"), "win-32");
        assert_eq!(subdir("freebsd", "x86_64"), "freebsd-64");
    }

    #[test]
    fn test_platform_facts() {
        let defaults = SystemDefaults::new("linux", "x86_64", "myenv");
        assert_eq!(defaults.get("platform").unwrap().clone().into_string().unwrap(), "linux");
        assert_eq!(defaults.get("subdir").unwrap().clone().into_string().unwrap(), "linux-64");
        assert_eq!(
            defaults.get("active_env_name").unwrap().clone().into_string().unwrap(),
            "myenv"
        );
    }

    #[test]
    fn test_static_defaults() {
        let defaults = SystemDefaults::new("linux", "x86_64", "base");
        assert!(defaults.has("channels"));
        assert!(defaults.has("reporters"));
        assert!(!defaults.get("always_yes").unwrap().clone().into_bool().unwrap());
        assert!(!defaults.has("pinned_packages"));
    }

    #[test]
    fn test_alias_lookup() {
        let defaults = SystemDefaults::new("linux", "x86_64", "base");
        assert!(defaults.has("yes"));
        assert!(defaults.has("auto_activate_base"));
    }

    #[test]
    fn test_with_value_registers_default() {
        let defaults = SystemDefaults::new("linux", "x86_64", "base")
            .with_value("solver", "libmamba")
            .with_value("yes", true);
        assert_eq!(defaults.get("solver").unwrap().clone().into_string().unwrap(), "libmamba");
        assert!(defaults.get("always_yes").unwrap().clone().into_bool().unwrap());
        assert!(defaults.keys().any(|k| k == "solver"));
    }
}
