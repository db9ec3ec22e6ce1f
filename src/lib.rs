//! Bootstrap a program's configuration from a single struct. Declare the
//! fields once, and get command-line flags, environment variables and a
//! config file merged into it.
//!
//! ```ignore
//! let mut config = AppConfig::default();
//! Bootconf::builder()
//!     .version(env!("CARGO_PKG_VERSION"))
//!     .env_prefix("APP")
//!     .init(&mut config);
//! ```
//!
//! # Declaring fields
//!
//! A config type implements [`Schema`] by listing one [`Field`] per struct
//! field, in declaration order. Each entry carries the serde name of the
//! field, its value kind, and optional metadata:
//!
//! ```ignore
//! impl Schema for AppConfig {
//!     const FIELDS: &'static [Field] = &[
//!         Field::of::<String>("title").tag("title").short('t').default("12").desc("AppTitle"),
//!         Field::of::<String>("text").tag("text,omitempty"),
//!         Field::of::<String>("internal"),
//!     ];
//! }
//! ```
//!
//! - **`tag`** names the canonical key used for the flag, the environment
//!   variable and the config file. Fields without a tag are invisible to
//!   every source and keep whatever value the instance had.
//! - **`,omitempty`** after the key keeps the field out of the flag set. It
//!   is still read from the file and the environment.
//! - **`default`** is a literal parsed according to the field kind. A literal
//!   that does not parse fails the load before any argument is looked at.
//! - **`short`** and **`desc`** give the flag a one-letter alias and help.
//!
//! Only the kinds implementing [`FlagType`] can be declared, so an
//! unsupported field type does not compile.
//!
//! # Layer precedence
//!
//! ```text
//! Instance values        whatever the struct held before loading
//!        ↑ overridden by
//! Flag defaults          current value, else the declared default
//!        ↑ overridden by
//! Config file            {dir}/{name}.toml or .json
//!        ↑ overridden by
//! Environment vars       PREFIX_KEY
//!        ↑ overridden by
//! Flags                  only those given on the command line
//! ```
//!
//! Every layer is sparse: a key absent from a layer falls through to the
//! layer below.
//!
//! # Built-in flags
//!
//! Every command has `--config`/`-c` (path to the config file, default
//! `{default_config_dir}/{default_config_name}`) and `--version`/`-v`. A
//! field may not claim these names. `--help`/`-h` comes from clap.
//!
//! The config path may name a file with or without an extension. The
//! extension is stripped and every supported format is tried in that
//! directory, the given extension first. A missing file is not an error.
//!
//! # Environment variables
//!
//! With prefix `APP`, key `title` is read from `APP_TITLE`; `idle-timeout`
//! from `APP_IDLE_TIMEOUT`. An empty value counts as unset. With no prefix,
//! the upper-cased key alone is used.
//!
//! # Error handling
//!
//! [`BootconfBuilder::load_into`] returns [`BootconfError`] and never exits.
//! [`BootconfBuilder::init`] is the startup wrapper: it prints the version,
//! help or error and exits the process.

pub mod duration;
pub mod error;
pub mod types;

mod builder;
mod cli;
mod env;
mod file;
mod merge;
mod resolve;
mod synth;
mod validate;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{Bootconf, BootconfBuilder, Outcome};
pub use error::BootconfError;
pub use file::ConfigLocation;
pub use synth::{DefaultSource, Registration};
pub use types::{Field, FieldKind, FlagType, Schema};
pub use value::FlagValue;
