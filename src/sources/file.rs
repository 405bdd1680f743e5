//! File-based configuration source.

use super::merge::{canonicalize, merge_documents};
use super::{ConfigSource, SourceKind};
use crate::error::{ContextError, FileParseError, Result};
use crate::keys::canonical_key;
use config::{FileFormat, Format, Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-based configuration source.
///
/// Reads an ordered list of configuration files ("condarc" files) and merges
/// them into one document when constructed. Earlier paths take precedence:
/// scalars come from the first file that defines them and sequences such as
/// `channels` are concatenated in path order.
///
/// Missing files are skipped silently. Files that cannot be read or parsed
/// contribute nothing and are recorded in [`diagnostics`](Self::diagnostics).
///
/// # Examples
///
/// ```rust,no_run
/// use condarc_context::sources::{ConfigSource, FileConfigSource};
///
/// let source = FileConfigSource::new(["/home/me/.condarc", "/opt/conda/.condarc"]);
/// for err in source.diagnostics() {
///     eprintln!("warning: {err}");
/// }
/// if source.has("channels") {
///     println!("channels: {:?}", source.get("channels"));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    format: FileFormat,
    paths: Vec<PathBuf>,
    data: Map<String, Value>,
    diagnostics: Vec<FileParseError>,
}

impl FileConfigSource {
    /// Load YAML configuration files, highest precedence first.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::with_format(FileFormat::Yaml, paths)
    }

    /// Load configuration files of the given format, highest precedence first.
    pub fn with_format<I, P>(format: FileFormat, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        let mut diagnostics = Vec::new();
        let mut documents = Vec::with_capacity(paths.len());

        for path in &paths {
            match load_document(format, path) {
                Ok(Some(document)) => documents.push(canonicalize(document, path)),
                Ok(None) => {
                    tracing::debug!(path = %path.display(), "configuration file not found, skipping");
                }
                Err(err) => {
                    tracing::warn!(
                        path = %err.path.display(),
                        error = %err.message,
                        "ignoring unparseable configuration file"
                    );
                    diagnostics.push(err);
                }
            }
        }

        tracing::debug!(
            files = paths.len(),
            loaded = documents.len(),
            failed = diagnostics.len(),
            "merged configuration files"
        );

        Self {
            format,
            data: merge_documents(documents),
            paths,
            diagnostics,
        }
    }

    /// The configured paths, in precedence order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The file format used for every path.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// The merged document.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

}

/// Read and parse one file. `Ok(None)` means the file does not exist.
fn load_document(
    format: FileFormat,
    path: &Path,
) -> std::result::Result<Option<Map<String, Value>>, FileParseError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(FileParseError::new(path, err)),
    };

    let uri = path.display().to_string();
    Format::parse(&format, Some(&uri), &text)
        .map(Some)
        .map_err(|err| FileParseError::new(path, err))
}

impl ConfigSource for FileConfigSource {
    fn has(&self, key: &str) -> bool {
        self.data.contains_key(canonical_key(key))
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.data
            .get(canonical_key(key))
            .cloned()
            .ok_or_else(|| ContextError::KeyNotFound {
                key: key.to_string(),
                consulted: vec![self.name()],
            })
    }

    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn name(&self) -> String {
        let paths: Vec<String> = self.paths.iter().map(|p| p.display().to_string()).collect();
        format!("file:[{}]", paths.join(", "))
    }

    /// Files that existed but could not be read or parsed.
    fn diagnostics(&self) -> &[FileParseError] {
        &self.diagnostics
    }
}
