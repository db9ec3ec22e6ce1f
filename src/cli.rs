//! Command-line handling: the tolerant config-path pre-scan, the strict
//! command with its built-in flags, and extraction of explicitly passed
//! values.
//!
//! The pre-scan exists because the full flag set depends on the schema and
//! the instance, while the config file location must be known first. It only
//! looks for `--config`/`-c` and never fails: everything else on the command
//! line is left for the strict pass, which knows every flag and reports
//! unknown ones through clap's usage errors.

use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::synth::Registration;
use crate::value::FlagValue;

pub const CONFIG_FLAG: &str = "config";
pub const VERSION_FLAG: &str = "version";

/// Find the value of `--config`/`-c` in `args` (program name first).
///
/// Accepts `--config <p>`, `--config=<p>`, `-c <p>`, `-c=<p>` and `-c<p>`.
/// Scanning stops at `--`. The last occurrence wins. Returns `None` when the
/// option is absent or has no value.
pub fn scan_config_path(args: &[OsString]) -> Option<String> {
    let mut found = None;
    let mut tokens = args.iter().skip(1).map(|a| a.to_string_lossy());

    while let Some(token) = tokens.next() {
        if token == "--" {
            break;
        }
        let inline = if let Some(rest) = token.strip_prefix("--config") {
            match rest.strip_prefix('=') {
                Some(value) => Some(value.to_string()),
                None if rest.is_empty() => None,
                // A longer flag such as `--configure`.
                None => continue,
            }
        } else if let Some(rest) = token.strip_prefix("-c") {
            if rest.is_empty() {
                None
            } else {
                Some(rest.strip_prefix('=').unwrap_or(rest).to_string())
            }
        } else {
            continue;
        };

        match inline {
            Some(value) => found = Some(value),
            None => {
                if let Some(next) = tokens.next() {
                    found = Some(next.into_owned());
                }
            }
        }
    }

    found
}

/// The strict command with the built-in `--config` and `--version` flags.
pub fn base_command(bin_name: &str, about: Option<&str>, default_config: &str) -> Command {
    let mut command = Command::new(bin_name.to_string())
        .disable_version_flag(true)
        .arg(
            Arg::new(CONFIG_FLAG)
                .short('c')
                .long(CONFIG_FLAG)
                .help("path to configuration")
                .default_value(default_config.to_string())
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(VERSION_FLAG)
                .short('v')
                .long(VERSION_FLAG)
                .help("show version")
                .action(ArgAction::SetTrue),
        );
    if let Some(about) = about {
        command = command.about(about.to_string());
    }
    command
}

/// Whether `--version` was passed.
pub fn version_requested(matches: &ArgMatches) -> bool {
    matches.get_flag(VERSION_FLAG)
}

/// The `--config` value the strict pass settled on.
pub fn config_path(matches: &ArgMatches) -> Option<String> {
    matches.get_one::<String>(CONFIG_FLAG).cloned()
}

/// Values of the synthesized flags that were given on the command line.
///
/// Flags left at their registered default are not included; their defaults
/// sit beneath the file and environment layers instead.
pub fn explicit_values<'r>(
    matches: &ArgMatches,
    registrations: &'r [Registration],
) -> Vec<(&'r Registration, FlagValue)> {
    registrations
        .iter()
        .filter(|reg| matches.value_source(reg.key) == Some(ValueSource::CommandLine))
        .filter_map(|reg| {
            matches
                .get_one::<FlagValue>(reg.key)
                .map(|value| (reg, value.clone()))
        })
        .collect()
}
