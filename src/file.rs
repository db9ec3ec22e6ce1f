//! Config file location, discovery and parsing.
//!
//! The `--config` value names a file with or without an extension. It is
//! normalized into a [`ConfigLocation`]: a search directory, a base name with
//! the extension stripped, and the stripped extension. Discovery then tries
//! `{dir}/{name}.{ext}` for each supported format, starting with the stripped
//! extension when it is one of them. The first file found wins.
//!
//! A missing file is not an error: the file layer is simply empty. Only
//! actual I/O failures (permissions, etc.) and malformed documents are
//! propagated.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::BootconfError;
use crate::types::Field;
use crate::value::FlagValue;

/// File formats understood by the loader, in discovery order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["toml", "json"];

/// Where to look for the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub dir: PathBuf,
    pub name: String,
    pub extension: Option<String>,
}

impl ConfigLocation {
    /// Normalize a `--config` value.
    ///
    /// An empty value falls back to `default_dir` and `default_name`. A path
    /// without a directory searches `.`.
    pub fn resolve(config_path: &str, default_dir: &str, default_name: &str) -> Self {
        if config_path.is_empty() {
            return Self {
                dir: PathBuf::from(default_dir),
                name: default_name.to_string(),
                extension: None,
            };
        }

        let path = Path::new(config_path);
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self {
            dir,
            name,
            extension,
        }
    }

    /// Candidate files in discovery order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let preferred = self
            .extension
            .as_deref()
            .filter(|ext| SUPPORTED_EXTENSIONS.contains(ext));
        preferred
            .into_iter()
            .chain(
                SUPPORTED_EXTENSIONS
                    .iter()
                    .copied()
                    .filter(|ext| Some(*ext) != preferred),
            )
            .map(|ext| self.dir.join(format!("{}.{ext}", self.name)))
            .collect()
    }
}

/// Read the first candidate file that exists.
///
/// Returns `Ok(None)` when there is none. When the only match is a file whose
/// extension has no parser, that is reported as [`BootconfError::UnsupportedFormat`].
pub fn load_config_file(
    location: &ConfigLocation,
) -> Result<Option<(PathBuf, String)>, BootconfError> {
    for path in location.candidates() {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "config file found");
                return Ok(Some((path, content)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(BootconfError::IoError { path, source: e }),
        }
    }

    if let Some(ext) = &location.extension
        && !SUPPORTED_EXTENSIONS.contains(&ext.as_str())
    {
        let path = location.dir.join(format!("{}.{ext}", location.name));
        if path.is_file() {
            return Err(BootconfError::UnsupportedFormat { path });
        }
    }

    debug!(dir = %location.dir.display(), name = %location.name, "no config file");
    Ok(None)
}

/// Parse a config document into a key/value map, by file extension.
pub fn parse_document(path: &Path, content: &str) -> Result<Map<String, Value>, BootconfError> {
    let parse_error = |reason: String| BootconfError::ParseError {
        path: path.to_path_buf(),
        reason,
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            let table: toml::Table = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            match serde_json::to_value(table).map_err(|e| parse_error(e.to_string()))? {
                Value::Object(map) => Ok(map),
                _ => Err(parse_error("document is not a table".into())),
            }
        }
        Some("json") => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        _ => Err(BootconfError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Find the document entry for a canonical key. Keys match case-insensitively.
pub(crate) fn lookup<'d>(document: &'d Map<String, Value>, key: &str) -> Option<&'d Value> {
    document.get(key).or_else(|| {
        document
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Build the file layer: one entry per tagged field present in the document.
pub fn file_layer(
    fields: &[Field],
    document: &Map<String, Value>,
) -> Result<Map<String, Value>, BootconfError> {
    let mut layer = Map::new();
    for field in fields {
        let Some(key) = field.key() else {
            continue;
        };
        let Some(raw) = lookup(document, key).filter(|v| !v.is_null()) else {
            continue;
        };
        let value =
            FlagValue::from_json(field.kind, raw).map_err(|reason| BootconfError::InvalidValue {
                key: key.to_string(),
                layer: "config file",
                reason,
            })?;
        layer.insert(field.name.to_string(), value.to_json());
    }
    Ok(layer)
}
