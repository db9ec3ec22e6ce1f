//! Core resolution pipeline: merge all config layers and produce a typed config.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Layers, lowest priority first:
//!
//! 1. The instance's current values
//! 2. Defaults of flags the user did not pass, when they came from a current
//!    value or a default literal
//! 3. The config file (validated first in strict mode)
//! 4. Environment variables
//! 5. Flags given on the command line
//!
//! The merged map is deserialized into the schema type in one step.

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::debug;

use crate::env;
use crate::error::BootconfError;
use crate::file;
use crate::merge::merge;
use crate::synth::{DefaultSource, Registration};
use crate::types::Schema;
use crate::validate;
use crate::value::FlagValue;

/// All pre-loaded data needed to resolve a config. No I/O happens here.
pub struct ResolveInput {
    /// The instance serialized before loading.
    pub current: Map<String, Value>,
    /// Resolved flag defaults, keyed by field name.
    pub flag_defaults: Map<String, Value>,
    /// Path and contents of the config file, if one was found.
    pub file: Option<(PathBuf, String)>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix. `None` means env disabled.
    pub env_prefix: Option<String>,
    /// Flags given on the command line, keyed by field name.
    pub flags: Map<String, Value>,
    /// Whether to reject unknown keys in the config file.
    pub strict: bool,
}

/// The defaults layer: flags whose default did not come from the zero value.
pub fn flag_defaults(registrations: &[Registration]) -> Map<String, Value> {
    registrations
        .iter()
        .filter(|reg| reg.source != DefaultSource::Zero)
        .map(|reg| (reg.field.name.to_string(), reg.default.to_json()))
        .collect()
}

/// The command-line layer from explicitly passed flag values.
pub fn flag_layer(explicit: &[(&Registration, FlagValue)]) -> Map<String, Value> {
    explicit
        .iter()
        .map(|(reg, value)| {
            debug!(flag = reg.key, value = %value, "flag given on command line");
            (reg.field.name.to_string(), value.to_json())
        })
        .collect()
}

/// Resolve configuration from pre-loaded inputs.
pub fn resolve<S: Schema>(input: ResolveInput) -> Result<S, BootconfError> {
    let mut merged = merge(input.current, input.flag_defaults);

    if let Some((path, content)) = &input.file {
        let document = file::parse_document(path, content)?;
        if input.strict {
            validate::validate_unknown_keys(S::FIELDS, &document, content, path)?;
        }
        let layer = file::file_layer(S::FIELDS, &document)?;
        debug!(path = %path.display(), keys = layer.len(), "file layer");
        merged = merge(merged, layer);
    }

    if let Some(prefix) = &input.env_prefix {
        let layer = env::env_layer(prefix, S::FIELDS, input.env_vars)?;
        debug!(prefix = %prefix, keys = layer.len(), "environment layer");
        merged = merge(merged, layer);
    }

    merged = merge(merged, input.flags);

    serde_json::from_value(Value::Object(merged)).map_err(BootconfError::Unmarshal)
}
