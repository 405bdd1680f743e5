//! Builder for constructing Context instances.

use super::context::Context;
use super::system::SystemDefaults;
use crate::sources::{
    CliConfigSource, ConfigSource, DEFAULT_ENV_PREFIX, EnvConfigSource, EnvKeyRegistry,
    FileConfigSource, ParsedArgs,
};
use config::FileFormat;
use std::path::PathBuf;

/// Where the environment source takes its variables from.
enum EnvSetting {
    Process,
    Vars(Vec<(String, String)>),
    Disabled,
}

/// Builder for constructing a [`Context`].
///
/// Sources are consulted in a fixed order:
///
/// 1. command-line arguments
/// 2. environment variables (`CONDA_*` by default)
/// 3. configuration files, earlier paths first
/// 4. custom sources, in the order they were added
/// 5. system defaults
///
/// # Examples
///
/// ```rust,no_run
/// use condarc_context::prelude::*;
///
/// let context = Context::builder()
///     .with_args(ParsedArgs::new().set("json", true).unset("quiet"))
///     .with_file("/home/me/.condarc")
///     .with_file("/opt/conda/.condarc")
///     .build();
///
/// for err in context.diagnostics() {
///     eprintln!("warning: {err}");
/// }
/// ```
pub struct ContextBuilder {
    args: ParsedArgs,
    env: EnvSetting,
    env_prefix: String,
    env_registry: EnvKeyRegistry,
    file_paths: Vec<PathBuf>,
    file_format: FileFormat,
    custom_sources: Vec<Box<dyn ConfigSource>>,
    system: Option<SystemDefaults>,
}

impl ContextBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            args: ParsedArgs::new(),
            env: EnvSetting::Process,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            env_registry: EnvKeyRegistry::default(),
            file_paths: Vec::new(),
            file_format: FileFormat::Yaml,
            custom_sources: Vec::new(),
            system: None,
        }
    }

    /// Use the arguments produced by the command-line front end.
    pub fn with_args(mut self, args: ParsedArgs) -> Self {
        self.args = args;
        self
    }

    /// Add a configuration file.
    ///
    /// Files added earlier take precedence over files added later.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Add several configuration files, highest precedence first.
    pub fn with_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.file_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Parse configuration files as `format` instead of YAML.
    pub fn with_file_format(mut self, format: FileFormat) -> Self {
        self.file_format = format;
        self
    }

    /// Read environment variables with `prefix` instead of `CONDA`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Read environment settings from `vars` instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = EnvSetting::Vars(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Replace the registry of multi-valued environment keys.
    pub fn with_env_registry(mut self, registry: EnvKeyRegistry) -> Self {
        self.env_registry = registry;
        self
    }

    /// Leave the environment source out entirely.
    pub fn without_env(mut self) -> Self {
        self.env = EnvSetting::Disabled;
        self
    }

    /// Use explicit system defaults instead of detecting them.
    pub fn with_system_defaults(mut self, system: SystemDefaults) -> Self {
        self.system = Some(system);
        self
    }

    /// Add a custom configuration source, consulted after the files.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Read every source and build the context.
    ///
    /// Missing files are skipped and unparseable ones are reported through
    /// [`Context::diagnostics`]; neither stops the build.
    pub fn build(self) -> Context {
        let mut sources: Vec<Box<dyn ConfigSource>> =
            Vec::with_capacity(3 + self.custom_sources.len());

        sources.push(Box::new(CliConfigSource::new(self.args)));

        let env = match self.env {
            EnvSetting::Process => Some(EnvConfigSource::new(&self.env_prefix)),
            EnvSetting::Vars(vars) => Some(EnvConfigSource::from_vars(&self.env_prefix, vars)),
            EnvSetting::Disabled => None,
        };
        if let Some(env) = env {
            sources.push(Box::new(env.with_registry(self.env_registry)));
        }

        sources.push(Box::new(FileConfigSource::with_format(
            self.file_format,
            self.file_paths,
        )));

        sources.extend(self.custom_sources);

        let system = self.system.unwrap_or_else(SystemDefaults::detect);
        Context::new(system, sources)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
