//! Error types for condarc-context.

use config::ValueKind;
use std::path::PathBuf;

/// Result type alias for condarc-context operations.
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors that can occur when resolving configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    /// No source and no system default defines the requested key.
    #[error("Configuration key not found: '{key}' (consulted: {})", .consulted.join(", "))]
    KeyNotFound {
        /// The key that was requested
        key: String,
        /// Names of the sources that were consulted, in precedence order
        consulted: Vec<String>,
    },

    /// A configuration file could not be read or parsed.
    #[error(transparent)]
    FileParse(#[from] FileParseError),

    /// A channel entry is neither a bare name nor a single-key map.
    #[error("Malformed channel entry at position {position}: {reason}")]
    MalformedChannelEntry {
        /// Zero-based index of the entry in the channel list
        position: usize,
        /// Why the entry was rejected
        reason: String,
    },

    /// A reporter entry does not have the `{backend, output}` shape.
    #[error("Malformed reporter entry at position {position}: {reason}")]
    MalformedReporterEntry {
        /// Zero-based index of the entry in the reporter list
        position: usize,
        /// Why the entry was rejected
        reason: String,
    },

    /// A value exists but cannot be read as the requested type.
    #[error("Invalid type for '{key}': expected {expected}, {reason}")]
    InvalidType {
        /// The key that was read
        key: String,
        /// The type the caller asked for
        expected: &'static str,
        /// What was found instead
        reason: String,
    },
}

impl ContextError {
    pub(crate) fn invalid_type(
        key: impl Into<String>,
        expected: &'static str,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidType {
            key: key.into(),
            expected,
            reason: reason.to_string(),
        }
    }
}

/// Short description of a value's type for error messages.
pub(crate) fn describe(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Nil => "null",
        ValueKind::Boolean(_) => "a boolean",
        ValueKind::Float(_) => "a float",
        ValueKind::String(_) => "a string",
        ValueKind::Table(_) => "a map",
        ValueKind::Array(_) => "a sequence",
        _ => "an integer",
    }
}

/// A single configuration file that failed to load.
///
/// These are non-fatal: the file contributes nothing to the merge and the
/// error is kept as a diagnostic on the file source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to parse configuration file {}: {message}", path.display())]
pub struct FileParseError {
    /// Path of the offending file
    pub path: PathBuf,
    /// Parser or I/O error message
    pub message: String,
}

impl FileParseError {
    /// Create a parse error for the given path.
    pub fn new(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
