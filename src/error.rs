use std::path::PathBuf;

use thiserror::Error;

use crate::types::FieldKind;

#[derive(Debug, Error)]
pub enum BootconfError {
    #[error("Invalid default '{literal}' for field '{field}' of type {kind}: {reason}")]
    InvalidDefault {
        field: String,
        kind: FieldKind,
        literal: String,
        reason: String,
    },

    #[error("Field '{field}' (key '{key}') is not a serialized field of the config struct")]
    UnknownField { field: String, key: String },

    #[error("Flag '{flag}' is declared more than once")]
    DuplicateFlag { flag: String },

    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Unsupported config format for {path} (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file:\n{}", join_lines(.0))]
    UnknownKeys(Vec<BootconfError>),

    #[error("Invalid value for '{key}' from {layer}: {reason}")]
    InvalidValue {
        key: String,
        layer: &'static str,
        reason: String,
    },

    #[error("Failed to apply merged configuration: {0}")]
    Unmarshal(#[source] serde_json::Error),

    #[error("Failed to read current configuration values: {0}")]
    Snapshot(#[source] serde_json::Error),
}

fn join_lines(errors: &[BootconfError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
