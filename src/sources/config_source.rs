//! Configuration source trait.

use crate::error::{FileParseError, Result};
use config::Value;
use std::fmt;

/// The kind of backing store a source reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Parsed command-line arguments
    Cli,
    /// Process environment variables
    Env,
    /// Merged configuration files
    File,
    /// Anything supplied by a collaborator
    Custom,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cli => "cli",
            Self::Env => "env",
            Self::File => "file",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Trait for configuration sources.
///
/// A source answers two questions about one backing store: does it define a
/// key, and what is the value. Sources never merge with one another; the
/// [`Context`](crate::core::Context) asks them in order and takes the first
/// answer.
///
/// Implement this trait to plug extra stores (plugin-provided settings, a
/// site policy file) into a context.
pub trait ConfigSource: Send + Sync {
    /// Whether this source defines `key`.
    ///
    /// Must not fail for absent keys.
    fn has(&self, key: &str) -> bool;

    /// Read the value of `key`.
    ///
    /// Only call this after [`has`](Self::has) returned `true`. Implementations
    /// return [`ContextError::KeyNotFound`](crate::error::ContextError::KeyNotFound)
    /// on a contract violation instead of inventing a default.
    fn get(&self, key: &str) -> Result<Value>;

    /// The kind of store behind this source.
    fn kind(&self) -> SourceKind;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String {
        self.kind().to_string()
    }

    /// Non-fatal problems met while building this source.
    fn diagnostics(&self) -> &[FileParseError] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(SourceKind::Cli.to_string(), "cli");
        assert_eq!(SourceKind::Env.to_string(), "env");
        assert_eq!(SourceKind::File.to_string(), "file");
        assert_eq!(SourceKind::Custom.to_string(), "custom");
    }
}
