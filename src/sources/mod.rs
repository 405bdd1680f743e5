//! Configuration source implementations.

mod cli;
mod config_source;
mod env;
mod file;
pub mod merge;

pub use cli::{CliConfigSource, ParsedArgs};
pub use config_source::{ConfigSource, SourceKind};
pub use env::{DEFAULT_ENV_PREFIX, EnvConfigSource, EnvKeyRegistry, PATH_LIST_DELIMITER};
pub use file::FileConfigSource;
