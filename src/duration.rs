//! Textual durations such as `5s`, `1h30m` or `250ms`.
//!
//! A literal is a sequence of decimal numbers, each with an optional fraction
//! and a unit suffix: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. The bare
//! literal `0` is also accepted. Negative durations are rejected because
//! [`Duration`] cannot represent them.
//!
//! [`format`] produces the same notation, so a formatted duration always
//! parses back to itself.

use std::time::Duration;

use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A duration literal that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration '{literal}': {reason}")]
pub struct DurationError {
    literal: String,
    reason: &'static str,
}

impl DurationError {
    fn new(literal: &str, reason: &'static str) -> Self {
        Self {
            literal: literal.to_string(),
            reason,
        }
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(nanos)
}

/// Parse a duration literal like `1h30m` or `1.5s`.
pub fn parse(literal: &str) -> Result<Duration, DurationError> {
    let text = literal.trim();
    if text.starts_with('-') {
        return Err(DurationError::new(literal, "negative durations are not supported"));
    }
    let text = text.strip_prefix('+').unwrap_or(text);
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if text.is_empty() {
        return Err(DurationError::new(literal, "empty duration"));
    }

    let mut total: u128 = 0;
    let mut rest = text;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationError::new(literal, "expected a number"));
        }

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, after_unit) = after_number.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::new(literal, "missing unit"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::new(literal, "unknown unit"))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| DurationError::new(literal, "number out of range"))?
        };
        let mut value = whole
            .checked_mul(scale)
            .ok_or_else(|| DurationError::new(literal, "duration out of range"))?;

        // Fraction digits beyond nanosecond precision cannot contribute.
        let mut divisor: u128 = 1;
        let mut fraction: u128 = 0;
        for digit in frac_part.chars().take(18) {
            fraction = fraction * 10 + u128::from(digit.to_digit(10).unwrap_or(0));
            divisor *= 10;
        }
        value += fraction * scale / divisor;

        total = total
            .checked_add(value)
            .ok_or_else(|| DurationError::new(literal, "duration out of range"))?;
        rest = after_unit;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| DurationError::new(literal, "duration out of range"))?;
    // Remainder is always below one second.
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, nanos))
}

/// Render a duration in the notation accepted by [`parse`].
///
/// Sub-second values use the largest fitting unit (`1.5ms`); longer values
/// are split into hours, minutes and seconds (`1h30m0s`).
pub fn format(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 1_000));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, 1_000_000));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let secs = u128::from(total_secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{}s", decimal(secs, NANOS_PER_SEC)));
    out
}

/// `value / unit` as a decimal string without trailing zeros.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Serde adapter storing a [`Duration`] as its textual form.
///
/// Deserialization accepts a duration literal, or a number of seconds.
///
/// ```ignore
/// #[serde(with = "bootconf::duration::serde")]
/// pub timeout: Duration,
/// ```
pub mod serde {
    use std::fmt;
    use std::time::Duration;

    use ::serde::de::{self, Visitor};
    use ::serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }

    pub(crate) struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration such as \"5s\" or a number of seconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            super::parse(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("negative durations are not supported"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Duration, E> {
            Duration::try_from_secs_f64(v).map_err(E::custom)
        }
    }

    /// The same adapter for `Option<Duration>`; `None` is kept as null.
    pub mod option {
        use std::fmt;
        use std::time::Duration;

        use ::serde::de::{self, Visitor};
        use ::serde::{Deserializer, Serializer};

        use super::DurationVisitor;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => serializer.serialize_some(&crate::duration::format(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            deserializer.deserialize_option(OptionVisitor)
        }

        struct OptionVisitor;

        impl<'de> Visitor<'de> for OptionVisitor {
            type Value = Option<Duration>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an optional duration")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(DurationVisitor).map(Some)
            }
        }
    }
}
