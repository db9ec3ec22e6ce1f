//! Flag synthesis: derive one command-line flag per schema field.
//!
//! Synthesis runs in two phases so that a bad schema never leaves a partially
//! built command behind:
//!
//! 1. [`synthesize`] walks [`Schema::FIELDS`] against the instance's current
//!    values and resolves every field's default. Any bad default literal fails
//!    here, before anything is registered.
//! 2. [`register`] checks the registrations for name clashes and only then
//!    adds them to the `clap::Command`.
//!
//! The default a flag is registered with is, in order of preference: the
//! field's current value when it is set, the parsed default literal, the
//! kind's zero value. A direct field counts as set when it differs from its
//! zero value; an `Option` field counts as set when it is `Some`.

use std::collections::HashSet;

use clap::{Arg, ArgAction, Command};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::BootconfError;
use crate::types::{Field, FieldKind, Schema};
use crate::value::FlagValue;

/// Long names every command reserves for itself.
pub const RESERVED_LONG: &[&str] = &["config", "version", "help"];
/// Short aliases every command reserves for itself.
pub const RESERVED_SHORT: &[char] = &['c', 'v', 'h'];

/// Where a registration's default came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSource {
    /// The field already held a value.
    Current,
    /// The field's default literal.
    Declared,
    /// Neither; the kind's zero value.
    Zero,
}

/// A flag about to be registered for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub field: &'static Field,
    pub key: &'static str,
    pub short: Option<char>,
    pub default: FlagValue,
    pub source: DefaultSource,
}

impl Registration {
    pub fn kind(&self) -> FieldKind {
        self.field.kind
    }

    pub fn help(&self) -> &'static str {
        self.field.desc
    }
}

/// Serialize the instance into its field map.
pub fn snapshot<S: Schema>(instance: &S) -> Result<Map<String, Value>, BootconfError> {
    match serde_json::to_value(instance).map_err(BootconfError::Snapshot)? {
        Value::Object(map) => Ok(map),
        other => Err(BootconfError::Snapshot(serde::ser::Error::custom(format!(
            "config must serialize to a map, got {other}"
        )))),
    }
}

/// Resolve a registration for every flag-eligible field of `S`.
///
/// Fails when a tagged field's name is not a key of the serialized instance.
pub fn synthesize<S: Schema>(instance: &S) -> Result<Vec<Registration>, BootconfError> {
    let current = snapshot(instance)?;
    check_field_names(S::FIELDS, &current)?;
    synthesize_fields(S::FIELDS, &current)
}

fn check_field_names(fields: &[Field], current: &Map<String, Value>) -> Result<(), BootconfError> {
    let missing = fields
        .iter()
        .filter_map(|field| field.key().map(|key| (field, key)))
        .find(|(field, _)| !current.contains_key(field.name));
    if let Some((field, key)) = missing {
        return Err(BootconfError::UnknownField {
            field: field.name.to_string(),
            key: key.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn synthesize_fields(
    fields: &'static [Field],
    current: &Map<String, Value>,
) -> Result<Vec<Registration>, BootconfError> {
    let mut registrations = Vec::new();

    for field in fields {
        let Some(key) = field.key() else {
            continue;
        };
        if field.is_omitted() {
            continue;
        }

        let declared = declared_default(field)?;
        let (default, source) = match (current_value(field, current)?, declared) {
            (Some(value), _) => (value, DefaultSource::Current),
            (None, Some(value)) => (value, DefaultSource::Declared),
            (None, None) => (FlagValue::zero(field.kind), DefaultSource::Zero),
        };

        trace!(key, kind = %field.kind, default = %default, ?source, "synthesized flag");
        registrations.push(Registration {
            field,
            key,
            short: field.short,
            default,
            source,
        });
    }

    Ok(registrations)
}

/// Parse the field's default literal, if it has a non-empty one.
fn declared_default(field: &Field) -> Result<Option<FlagValue>, BootconfError> {
    let Some(literal) = field.default.filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    FlagValue::parse(field.kind, literal)
        .map(Some)
        .map_err(|reason| BootconfError::InvalidDefault {
            field: field.name.to_string(),
            kind: field.kind,
            literal: literal.to_string(),
            reason,
        })
}

/// The field's current value, or `None` when it is unset.
pub(crate) fn current_value(
    field: &Field,
    current: &Map<String, Value>,
) -> Result<Option<FlagValue>, BootconfError> {
    let Some(raw) = current.get(field.name).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let value =
        FlagValue::from_json(field.kind, raw).map_err(|reason| BootconfError::InvalidValue {
            key: field.name.to_string(),
            layer: "current value",
            reason,
        })?;
    if !field.optional && value.is_zero() {
        return Ok(None);
    }
    Ok(Some(value))
}

/// Add one flag per registration to `command`.
///
/// All names are checked before the first flag is added.
pub fn register(command: Command, registrations: &[Registration]) -> Result<Command, BootconfError> {
    let mut longs: HashSet<&str> = RESERVED_LONG.iter().copied().collect();
    let mut shorts: HashSet<char> = RESERVED_SHORT.iter().copied().collect();
    for reg in registrations {
        if !longs.insert(reg.key) {
            return Err(BootconfError::DuplicateFlag {
                flag: format!("--{}", reg.key),
            });
        }
        if let Some(short) = reg.short
            && !shorts.insert(short)
        {
            return Err(BootconfError::DuplicateFlag {
                flag: format!("-{short}"),
            });
        }
    }

    Ok(registrations
        .iter()
        .fold(command, |command, reg| command.arg(flag_arg(reg))))
}

fn flag_arg(reg: &Registration) -> Arg {
    let kind = reg.kind();
    let mut arg = Arg::new(reg.key)
        .long(reg.key)
        .action(ArgAction::Set)
        .value_parser(move |text: &str| FlagValue::parse(kind, text));

    if let Some(short) = reg.short {
        arg = arg.short(short);
    }
    if !reg.help().is_empty() {
        arg = arg.help(reg.help());
    }
    let default = reg.default.to_string();
    if !default.is_empty() {
        arg = arg.default_value(default);
    }
    if kind == FieldKind::Bool {
        arg = arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true");
    }
    arg
}
