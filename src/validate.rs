//! Strict-mode validation: detect unknown keys in config files.
//!
//! A key is known when it matches the canonical key of a tagged field,
//! case-insensitively. Each unknown key is reported with its file path and a
//! best-effort line number.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::BootconfError;
use crate::types::Field;

/// Validate that a parsed config document contains no keys unknown to `fields`.
pub fn validate_unknown_keys(
    fields: &[Field],
    document: &Map<String, Value>,
    content: &str,
    path: &Path,
) -> Result<(), BootconfError> {
    let errors: Vec<BootconfError> = document
        .keys()
        .filter(|key| {
            !fields
                .iter()
                .filter_map(Field::key)
                .any(|known| known.eq_ignore_ascii_case(key))
        })
        .map(|key| BootconfError::UnknownKey {
            key: key.clone(),
            path: path.to_path_buf(),
            line: find_key_line(content, key),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BootconfError::UnknownKeys(errors))
    }
}

/// Find the 1-indexed line on which `key` is assigned.
///
/// Handles bare and quoted keys followed by `=` (TOML) or `:` (JSON). Returns
/// 0 if the key cannot be located.
fn find_key_line(content: &str, key: &str) -> usize {
    let quoted = format!("\"{key}\"");
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim_start().trim_start_matches(['{', ',']).trim_start();
        let after_key = trimmed
            .strip_prefix(quoted.as_str())
            .or_else(|| trimmed.strip_prefix(key));
        if let Some(after_key) = after_key
            && after_key.trim_start().starts_with(['=', ':'])
        {
            return i + 1;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parse_document;
    use crate::fixtures::test::TitleConfig;
    use crate::types::Schema;
    use std::path::PathBuf;

    fn check(path: &str, content: &str) -> Result<(), BootconfError> {
        let path = PathBuf::from(path);
        let doc = parse_document(&path, content).unwrap();
        validate_unknown_keys(TitleConfig::FIELDS, &doc, content, &path)
    }

    #[test]
    fn valid_config_passes() {
        let content = "title = \"x\"\ntext = \"y\"\nport = 8080\n";
        assert!(check("/test/config.toml", content).is_ok());
    }

    #[test]
    fn untagged_field_name_is_unknown() {
        let err = check("/test/config.toml", "internal = \"x\"\n").unwrap_err();
        assert!(matches!(err, BootconfError::UnknownKeys(ref errs) if errs.len() == 1));
    }

    #[test]
    fn unknown_toml_key_reports_line() {
        let content = "title = \"x\"\n\ntypo = 1\n";
        match check("/test/config.toml", content).unwrap_err() {
            BootconfError::UnknownKeys(errs) => match &errs[0] {
                BootconfError::UnknownKey { key, line, .. } => {
                    assert_eq!(key, "typo");
                    assert_eq!(*line, 3);
                }
                other => panic!("expected UnknownKey, got {other:?}"),
            },
            other => panic!("expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn unknown_json_key_reports_line() {
        let content = "{\n  \"title\": \"x\",\n  \"typo\": 1\n}\n";
        match check("/test/config.json", content).unwrap_err() {
            BootconfError::UnknownKeys(errs) => match &errs[0] {
                BootconfError::UnknownKey { line, .. } => assert_eq!(*line, 3),
                other => panic!("expected UnknownKey, got {other:?}"),
            },
            other => panic!("expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn key_match_is_case_insensitive() {
        assert!(check("/test/config.toml", "TITLE = \"x\"\n").is_ok());
    }

    #[test]
    fn find_key_line_not_found() {
        assert_eq!(find_key_line("title = 1\n", "missing"), 0);
    }

    #[test]
    fn find_key_line_skips_prefix_matches() {
        assert_eq!(find_key_line("titles = 1\ntitle = 2\n", "title"), 2);
    }
}
