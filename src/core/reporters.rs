//! Reporter backend/output selections.
//!
//! The `reporters` setting is an ordinary sequence of maps; a reporter
//! dispatcher outside this crate uses the selections to find renderers.

use crate::error::{ContextError, Result, describe};
use config::{Value, ValueKind};
use serde::{Deserialize, Serialize};

/// One `{backend, output}` pair from the `reporters` setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterSelection {
    /// Name of the rendering backend (`console`, `json`, ...)
    pub backend: String,
    /// Name of the output the rendered text goes to
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_output() -> String {
    "stdout".to_string()
}

/// Parse the raw `reporters` sequence, keeping declaration order.
pub fn parse_reporters(entries: Vec<Value>) -> Result<Vec<ReporterSelection>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            if !matches!(entry.kind, ValueKind::Table(_)) {
                return Err(ContextError::MalformedReporterEntry {
                    position,
                    reason: format!("expected a map, found {}", describe(&entry.kind)),
                });
            }
            ReporterSelection::deserialize(entry).map_err(|err| {
                ContextError::MalformedReporterEntry {
                    position,
                    reason: err.to_string(),
                }
            })
        })
        .collect()
}
