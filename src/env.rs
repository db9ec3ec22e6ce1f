use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::BootconfError;
use crate::types::Field;
use crate::value::FlagValue;

/// Environment variable name for a canonical key.
///
/// `PREFIX_KEY` when a prefix is set, `KEY` otherwise, upper-cased, with `-`
/// and `.` turned into `_` so every key has a name a shell can export.
pub fn env_key(prefix: &str, key: &str) -> String {
    let raw = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}_{key}")
    };
    raw.to_uppercase().replace(['-', '.'], "_")
}

/// Build the environment layer for every tagged field, flagged or not.
///
/// Values are parsed as the field's kind. Empty variables count as unset.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn env_layer(
    prefix: &str,
    fields: &[Field],
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Map<String, Value>, BootconfError> {
    let vars: HashMap<String, String> = vars.into_iter().collect();
    let mut layer = Map::new();

    for field in fields {
        let Some(key) = field.key() else {
            continue;
        };
        let name = env_key(prefix, key);
        let Some(text) = vars.get(&name).filter(|t| !t.is_empty()) else {
            continue;
        };
        let value = FlagValue::parse(field.kind, text).map_err(|reason| {
            BootconfError::InvalidValue {
                key: name.clone(),
                layer: "environment",
                reason,
            }
        })?;
        layer.insert(field.name.to_string(), value.to_json());
    }

    Ok(layer)
}
