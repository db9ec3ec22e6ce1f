//! The schema descriptor: how a config struct describes its fields.
//!
//! A config struct implements [`Schema`] by listing its fields in a static
//! table. Each [`Field`] names the serde field, carries the key tag that places
//! it on the configuration surface, and optionally a short alias, a default
//! literal and a description. The field's kind comes from its Rust type through
//! [`FlagType`], so only the supported primitive types can be declared:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Default)]
//! struct AppConfig {
//!     title: String,
//!     text: String,
//! }
//!
//! impl Schema for AppConfig {
//!     const FIELDS: &'static [Field] = &[
//!         Field::of::<String>("title").tag("title").short('t').default("12").desc("AppTitle"),
//!         Field::of::<String>("text").tag("text,omitempty"),
//!     ];
//! }
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Tag qualifier that keeps a field off the command line.
pub const OMIT_QUALIFIER: &str = "omitempty";

/// A config struct that bootconf can populate.
///
/// The struct must serialize to a flat map whose keys are the `name`s listed in
/// [`FIELDS`](Self::FIELDS), and deserialize back from one.
pub trait Schema: Serialize + DeserializeOwned {
    /// Field descriptors in declaration order.
    const FIELDS: &'static [Field];
}

/// The primitive kinds a config field can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F64,
    String,
    Duration,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::F64 => "f64",
            FieldKind::String => "string",
            FieldKind::Duration => "duration",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust types usable as config fields.
///
/// Implemented for the supported primitives and for `Option` of each of them.
/// Any other field type is rejected when the schema table is compiled.
pub trait FlagType {
    const KIND: FieldKind;
    /// Whether the field is nilable (`Option<T>`).
    const OPTIONAL: bool = false;
}

macro_rules! flag_types {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FlagType for $ty {
                const KIND: FieldKind = FieldKind::$kind;
            }

            impl FlagType for Option<$ty> {
                const KIND: FieldKind = FieldKind::$kind;
                const OPTIONAL: bool = true;
            }
        )*
    };
}

flag_types! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f64 => F64,
    String => String,
    Duration => Duration,
}

/// Descriptor for one field of a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Serde name of the field.
    pub name: &'static str,
    /// Key tag: the canonical key, optionally followed by `,qualifier`s.
    /// Fields without a tag are not part of the configuration surface.
    pub tag: Option<&'static str>,
    pub short: Option<char>,
    /// Default literal, parsed as [`kind`](Self::kind) at load time.
    pub default: Option<&'static str>,
    pub desc: &'static str,
    pub kind: FieldKind,
    pub optional: bool,
}

impl Field {
    /// Describe the field `name` whose Rust type is `T`.
    pub const fn of<T: FlagType>(name: &'static str) -> Self {
        Self {
            name,
            tag: None,
            short: None,
            default: None,
            desc: "",
            kind: T::KIND,
            optional: T::OPTIONAL,
        }
    }

    pub const fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    pub const fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub const fn default(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    pub const fn desc(mut self, desc: &'static str) -> Self {
        self.desc = desc;
        self
    }

    /// The canonical key, or `None` when the field has no tag.
    pub fn key(&self) -> Option<&'static str> {
        let tag = self.tag?;
        Some(tag.split(',').next().unwrap_or(tag))
    }

    /// Whether the tag carries the [`OMIT_QUALIFIER`].
    pub fn is_omitted(&self) -> bool {
        self.tag
            .is_some_and(|tag| tag.split(',').skip(1).any(|q| q.trim() == OMIT_QUALIFIER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_comes_from_rust_type() {
        assert_eq!(Field::of::<bool>("a").kind, FieldKind::Bool);
        assert_eq!(Field::of::<u64>("a").kind, FieldKind::U64);
        assert_eq!(Field::of::<Duration>("a").kind, FieldKind::Duration);
        assert!(!Field::of::<i32>("a").optional);
    }

    #[test]
    fn option_is_nilable_with_inner_kind() {
        let field = Field::of::<Option<f64>>("ratio");
        assert_eq!(field.kind, FieldKind::F64);
        assert!(field.optional);
    }

    #[test]
    fn key_is_tag_before_comma() {
        assert_eq!(Field::of::<String>("t").tag("title").key(), Some("title"));
        assert_eq!(
            Field::of::<String>("t").tag("title,squash").key(),
            Some("title")
        );
        assert_eq!(Field::of::<String>("t").key(), None);
    }

    #[test]
    fn omit_qualifier_detected() {
        assert!(Field::of::<String>("t").tag("text,omitempty").is_omitted());
        assert!(Field::of::<String>("t").tag("text,squash,omitempty").is_omitted());
        assert!(!Field::of::<String>("t").tag("text,squash").is_omitted());
        assert!(!Field::of::<String>("t").tag("omitempty").is_omitted());
        assert!(!Field::of::<String>("t").is_omitted());
    }

    #[test]
    fn builder_methods_are_const() {
        const FIELD: Field = Field::of::<u32>("workers")
            .tag("workers")
            .short('w')
            .default("4")
            .desc("worker count");
        assert_eq!(FIELD.short, Some('w'));
        assert_eq!(FIELD.default, Some("4"));
        assert_eq!(FIELD.desc, "worker count");
    }
}
