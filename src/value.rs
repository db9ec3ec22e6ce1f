//! Typed values for each [`FieldKind`], with the text parsers used for default
//! literals and environment variables and the coercions used for file values.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::duration;
use crate::types::FieldKind;

/// A value of one of the supported field kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F64(f64),
    String(String),
    Duration(Duration),
}

/// Parse a finite float. `inf` and `NaN` have no document form.
fn parse_finite(text: &str) -> Result<f64, String> {
    let x: f64 = text.parse().map_err(|e| format!("{e}"))?;
    if x.is_finite() {
        Ok(x)
    } else {
        Err(format!("'{text}' is not a finite number"))
    }
}

/// Parse a boolean the way command-line tools traditionally accept them.
pub fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("'{text}' is not a boolean")),
    }
}

impl FlagValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FlagValue::Bool(_) => FieldKind::Bool,
            FlagValue::I32(_) => FieldKind::I32,
            FlagValue::I64(_) => FieldKind::I64,
            FlagValue::U32(_) => FieldKind::U32,
            FlagValue::U64(_) => FieldKind::U64,
            FlagValue::F64(_) => FieldKind::F64,
            FlagValue::String(_) => FieldKind::String,
            FlagValue::Duration(_) => FieldKind::Duration,
        }
    }

    /// The zero value of `kind`.
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Bool => FlagValue::Bool(false),
            FieldKind::I32 => FlagValue::I32(0),
            FieldKind::I64 => FlagValue::I64(0),
            FieldKind::U32 => FlagValue::U32(0),
            FieldKind::U64 => FlagValue::U64(0),
            FieldKind::F64 => FlagValue::F64(0.0),
            FieldKind::String => FlagValue::String(String::new()),
            FieldKind::Duration => FlagValue::Duration(Duration::ZERO),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == FlagValue::zero(self.kind())
    }

    /// Parse `text` as a value of `kind`.
    pub fn parse(kind: FieldKind, text: &str) -> Result<Self, String> {
        let value = match kind {
            FieldKind::Bool => FlagValue::Bool(parse_bool(text)?),
            FieldKind::I32 => FlagValue::I32(text.parse().map_err(|e| format!("{e}"))?),
            FieldKind::I64 => FlagValue::I64(text.parse().map_err(|e| format!("{e}"))?),
            FieldKind::U32 => FlagValue::U32(text.parse().map_err(|e| format!("{e}"))?),
            FieldKind::U64 => FlagValue::U64(text.parse().map_err(|e| format!("{e}"))?),
            FieldKind::F64 => FlagValue::F64(parse_finite(text)?),
            FieldKind::String => FlagValue::String(text.to_string()),
            FieldKind::Duration => {
                FlagValue::Duration(duration::parse(text).map_err(|e| e.to_string())?)
            }
        };
        Ok(value)
    }

    /// Coerce a loosely typed document value into `kind`.
    ///
    /// Numbers and booleans may arrive as strings (environment variables, hand
    /// written files); strings accept numbers and booleans verbatim; durations
    /// accept a literal or a number of seconds.
    pub fn from_json(kind: FieldKind, value: &Value) -> Result<Self, String> {
        if let Value::String(text) = value {
            return FlagValue::parse(kind, text);
        }
        let mismatch = || format!("expected {kind}, found {value}");

        let coerced = match (kind, value) {
            (FieldKind::Bool, Value::Bool(b)) => FlagValue::Bool(*b),
            (FieldKind::I32, Value::Number(n)) => FlagValue::I32(
                n.as_i64()
                    .and_then(|i| i32::try_from(i).ok())
                    .ok_or_else(mismatch)?,
            ),
            (FieldKind::I64, Value::Number(n)) => FlagValue::I64(n.as_i64().ok_or_else(mismatch)?),
            (FieldKind::U32, Value::Number(n)) => FlagValue::U32(
                n.as_u64()
                    .and_then(|u| u32::try_from(u).ok())
                    .ok_or_else(mismatch)?,
            ),
            (FieldKind::U64, Value::Number(n)) => FlagValue::U64(n.as_u64().ok_or_else(mismatch)?),
            (FieldKind::F64, Value::Number(n)) => FlagValue::F64(n.as_f64().ok_or_else(mismatch)?),
            (FieldKind::String, Value::Number(n)) => FlagValue::String(n.to_string()),
            (FieldKind::String, Value::Bool(b)) => FlagValue::String(b.to_string()),
            (FieldKind::Duration, Value::Number(n)) => {
                let secs = n.as_f64().ok_or_else(mismatch)?;
                FlagValue::Duration(Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())?)
            }
            _ => return Err(mismatch()),
        };
        Ok(coerced)
    }

    /// The document form used by the merge pipeline. Durations are stored as
    /// text so the schema's duration adapter can read them back.
    pub fn to_json(&self) -> Value {
        match self {
            FlagValue::Bool(b) => Value::from(*b),
            FlagValue::I32(i) => Value::from(*i),
            FlagValue::I64(i) => Value::from(*i),
            FlagValue::U32(u) => Value::from(*u),
            FlagValue::U64(u) => Value::from(*u),
            FlagValue::F64(f) => Value::from(*f),
            FlagValue::String(s) => Value::from(s.as_str()),
            FlagValue::Duration(d) => Value::from(duration::format(*d)),
        }
    }
}

/// Text form, accepted back by [`FlagValue::parse`].
impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::I32(i) => write!(f, "{i}"),
            FlagValue::I64(i) => write!(f, "{i}"),
            FlagValue::U32(u) => write!(f, "{u}"),
            FlagValue::U64(u) => write!(f, "{u}"),
            FlagValue::F64(x) => write!(f, "{x}"),
            FlagValue::String(s) => f.write_str(s),
            FlagValue::Duration(d) => f.write_str(&duration::format(*d)),
        }
    }
}
