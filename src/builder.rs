use std::ffi::OsString;
use std::marker::PhantomData;
use std::path::Path;

use tracing::debug;

use crate::cli;
use crate::error::BootconfError;
use crate::file::{self, ConfigLocation};
use crate::resolve::{self, ResolveInput};
use crate::synth;
use crate::types::Schema;

/// Entry point for building a bootconf loader.
pub struct Bootconf;

impl Bootconf {
    pub fn builder<S: Schema>() -> BootconfBuilder<S> {
        BootconfBuilder::new()
    }
}

/// What a load produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The instance now holds the merged configuration.
    Loaded,
    /// `--version` was passed; the instance was left untouched.
    Version(String),
}

/// Builder for the flag set and the layered load.
///
/// Everything has a default, so `Bootconf::builder().load_into(&mut config)`
/// reads `./config.{toml,json}`, unprefixed environment variables and the
/// process arguments.
pub struct BootconfBuilder<S: Schema> {
    version: String,
    default_config_dir: String,
    default_config_name: String,
    env_prefix: String,
    env_enabled: bool,
    strict: bool,
    bin_name: Option<String>,
    about: Option<String>,
    args: Option<Vec<OsString>>,
    env_vars: Option<Vec<(String, String)>>,
    _phantom: PhantomData<S>,
}

impl<S: Schema> BootconfBuilder<S> {
    fn new() -> Self {
        Self {
            version: "0.0.0".to_string(),
            default_config_dir: ".".to_string(),
            default_config_name: "config".to_string(),
            env_prefix: String::new(),
            env_enabled: true,
            strict: false,
            bin_name: None,
            about: None,
            args: None,
            env_vars: None,
            _phantom: PhantomData,
        }
    }

    /// The version printed for `--version` (default: `"0.0.0"`).
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Directory searched when `--config` is not given (default: `"."`).
    pub fn default_config_dir(mut self, dir: &str) -> Self {
        self.default_config_dir = dir.to_string();
        self
    }

    /// Base name searched when `--config` is not given (default: `"config"`).
    pub fn default_config_name(mut self, name: &str) -> Self {
        self.default_config_name = name.to_string();
        self
    }

    /// Prefix for environment variables (default: none). With prefix `APP`,
    /// key `title` is read from `APP_TITLE`.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, unknown keys in the config file produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Program name shown in help and usage (default: from the first argument).
    pub fn bin_name(mut self, name: &str) -> Self {
        self.bin_name = Some(name.to_string());
        self
    }

    /// One-line description shown in help.
    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    /// Arguments to parse, program name first (default: `std::env::args_os()`).
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Environment to read (default: `std::env::vars()`).
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// The config path used when `--config` is absent.
    fn default_config_path(&self) -> String {
        Path::new(&self.default_config_dir)
            .join(&self.default_config_name)
            .to_string_lossy()
            .into_owned()
    }

    fn effective_bin_name(&self, args: &[OsString]) -> String {
        if let Some(name) = &self.bin_name {
            return name.clone();
        }
        args.first()
            .and_then(|arg0| Path::new(arg0).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string())
    }

    fn effective_env_prefix(&self) -> Option<String> {
        self.env_enabled.then(|| self.env_prefix.clone())
    }

    /// Synthesize the flag set, parse the arguments and merge every layer
    /// into `instance`.
    ///
    /// `instance` keeps its values when loading fails or `--version` is given.
    pub fn load_into(self, instance: &mut S) -> Result<Outcome, BootconfError> {
        let args = self
            .args
            .clone()
            .unwrap_or_else(|| std::env::args_os().collect());
        let default_config = self.default_config_path();

        let scanned = cli::scan_config_path(&args).unwrap_or_else(|| default_config.clone());
        debug!(config = %scanned, "pre-scanned config path");

        let registrations = synth::synthesize(instance)?;
        let command = synth::register(
            cli::base_command(
                &self.effective_bin_name(&args),
                self.about.as_deref(),
                &default_config,
            ),
            &registrations,
        )?;
        let matches = command.try_get_matches_from(&args)?;

        if cli::version_requested(&matches) {
            return Ok(Outcome::Version(self.version));
        }

        // The strict parse sees every spelling of `-c`, including clusters
        // such as `-dc path`, so its value wins over the pre-scan.
        let config_path = cli::config_path(&matches).unwrap_or(scanned);
        let location = ConfigLocation::resolve(
            &config_path,
            &self.default_config_dir,
            &self.default_config_name,
        );
        debug!(dir = %location.dir.display(), name = %location.name, "config location");
        let file = file::load_config_file(&location)?;

        let env_prefix = self.effective_env_prefix();
        let env_vars = match (&env_prefix, self.env_vars) {
            (None, _) => Vec::new(),
            (Some(_), Some(vars)) => vars,
            (Some(_), None) => std::env::vars().collect(),
        };

        let explicit = cli::explicit_values(&matches, &registrations);
        let input = ResolveInput {
            current: synth::snapshot(instance)?,
            flag_defaults: resolve::flag_defaults(&registrations),
            file,
            env_vars,
            env_prefix,
            flags: resolve::flag_layer(&explicit),
            strict: self.strict,
        };

        *instance = resolve::resolve(input)?;
        Ok(Outcome::Loaded)
    }

    /// [`load_into`](Self::load_into) on a fresh `S::default()`.
    ///
    /// Returns `None` when `--version` was given.
    pub fn load(self) -> Result<Option<S>, BootconfError>
    where
        S: Default,
    {
        let mut instance = S::default();
        match self.load_into(&mut instance)? {
            Outcome::Loaded => Ok(Some(instance)),
            Outcome::Version(_) => Ok(None),
        }
    }

    /// [`load_into`](Self::load_into) for process startup.
    ///
    /// Prints the version and exits with status 0 for `--version`. Argument
    /// errors and `--help` are rendered by clap, which picks the exit status.
    /// Any other error is printed to stderr and exits with status 1.
    pub fn init(self, instance: &mut S) {
        match self.load_into(instance) {
            Ok(Outcome::Loaded) => {}
            Ok(Outcome::Version(version)) => {
                println!("{version}");
                std::process::exit(0);
            }
            Err(BootconfError::Args(e)) => e.exit(),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{AllKinds, BadDefault, TitleConfig};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn builder_in(dir: &TempDir) -> BootconfBuilder<TitleConfig> {
        Bootconf::builder::<TitleConfig>()
            .default_config_dir(dir.path().to_str().unwrap())
            .env_vars(Vec::<(String, String)>::new())
    }

    fn load(builder: BootconfBuilder<TitleConfig>) -> TitleConfig {
        let mut config = TitleConfig::default();
        assert_eq!(builder.load_into(&mut config).unwrap(), Outcome::Loaded);
        config
    }

    #[test]
    fn defaults() {
        let builder = Bootconf::builder::<TitleConfig>();
        assert_eq!(builder.version, "0.0.0");
        assert_eq!(builder.default_config_path(), "./config");
        assert_eq!(builder.effective_env_prefix(), Some(String::new()));
        assert!(!builder.strict);
    }

    #[test]
    fn env_prefix_and_no_env() {
        let builder = Bootconf::builder::<TitleConfig>().env_prefix("APP");
        assert_eq!(builder.effective_env_prefix(), Some("APP".to_string()));
        let builder = builder.no_env();
        assert_eq!(builder.effective_env_prefix(), None);
    }

    #[test]
    fn bin_name_from_first_argument() {
        let builder = Bootconf::builder::<TitleConfig>();
        let args = vec![OsString::from("/usr/local/bin/tool")];
        assert_eq!(builder.effective_bin_name(&args), "tool");
        assert_eq!(builder.effective_bin_name(&[]), "app");
        let builder = builder.bin_name("named");
        assert_eq!(builder.effective_bin_name(&args), "named");
    }

    #[test]
    fn declared_default_without_any_source() {
        let dir = TempDir::new().unwrap();
        let config = load(builder_in(&dir).args(["app"]));
        assert_eq!(config.title, "12");
    }

    #[test]
    fn explicit_flag_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "title = \"A\"\n").unwrap();
        let config = load(
            builder_in(&dir)
                .env_vars([("TITLE", "B")])
                .args(["app", "--title=Custom"]),
        );
        assert_eq!(config.title, "Custom");
    }

    #[test]
    fn env_wins_over_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "title = \"A\"\n").unwrap();
        let config = load(builder_in(&dir).env_vars([("TITLE", "B")]).args(["app"]));
        assert_eq!(config.title, "B");
    }

    #[test]
    fn file_wins_over_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "title = \"A\"\n").unwrap();
        let config = load(builder_in(&dir).args(["app"]));
        assert_eq!(config.title, "A");
    }

    #[test]
    fn config_flag_points_at_file() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("configs");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("app.json"), r#"{"title": "json", "text": "t"}"#).unwrap();
        let path = sub.join("app.json");
        let config = load(builder_in(&dir).args(["app", "-c", path.to_str().unwrap()]));
        assert_eq!(config.title, "json");
        assert_eq!(config.text, "t");
    }

    #[test]
    fn version_short_circuits() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "title = \"A\"\n").unwrap();
        let mut config = TitleConfig::default();
        let outcome = builder_in(&dir)
            .version("1.2.3")
            .args(["app", "--version"])
            .load_into(&mut config)
            .unwrap();
        assert_eq!(outcome, Outcome::Version("1.2.3".into()));
        assert_eq!(config, TitleConfig::default());
    }

    #[test]
    fn load_builds_from_default() {
        let dir = TempDir::new().unwrap();
        let config = builder_in(&dir)
            .args(["app", "-t", "short"])
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(config.title, "short");
        assert_eq!(config.retries, Some(3));

        let version = builder_in(&dir).args(["app", "--version"]).load().unwrap();
        assert_eq!(version, None);
    }

    #[test]
    fn version_short_circuits_before_reading_a_broken_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "title = \n").unwrap();
        let mut config = TitleConfig::default();
        let outcome = builder_in(&dir)
            .args(["app", "-v"])
            .load_into(&mut config)
            .unwrap();
        assert!(matches!(outcome, Outcome::Version(_)));
    }

    #[test]
    fn unknown_flag_is_an_argument_error() {
        let dir = TempDir::new().unwrap();
        let mut config = TitleConfig::default();
        let result = builder_in(&dir)
            .args(["app", "--nope"])
            .load_into(&mut config);
        assert!(matches!(result, Err(BootconfError::Args(_))));
    }

    #[test]
    fn bad_default_fails_the_load() {
        let mut config = BadDefault::default();
        let result = Bootconf::builder::<BadDefault>()
            .args(["app"])
            .no_env()
            .load_into(&mut config);
        assert!(matches!(result, Err(BootconfError::InvalidDefault { .. })));
    }

    #[test]
    fn failed_load_leaves_instance_untouched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "port = \"x\"\n").unwrap();
        let mut config = TitleConfig {
            title: "before".into(),
            ..TitleConfig::default()
        };
        let result = builder_in(&dir).args(["app"]).load_into(&mut config);
        assert!(result.is_err());
        assert_eq!(config.title, "before");
    }

    #[test]
    fn config_flag_inside_short_cluster() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mine.toml");
        fs::write(&path, "name = \"fromfile\"\n").unwrap();
        let mut config = AllKinds::default();
        let outcome = Bootconf::builder::<AllKinds>()
            .default_config_dir(dir.path().to_str().unwrap())
            .no_env()
            .args(["app", "-dc", path.to_str().unwrap()])
            .load_into(&mut config)
            .unwrap();
        assert_eq!(outcome, Outcome::Loaded);
        assert!(config.debug);
        assert_eq!(config.name, "fromfile");
    }

    #[test]
    fn non_finite_float_flag_is_an_argument_error() {
        let mut config = AllKinds::default();
        let result = Bootconf::builder::<AllKinds>()
            .default_config_dir("/nonexistent")
            .no_env()
            .args(["app", "--ratio", "inf"])
            .load_into(&mut config);
        assert!(matches!(result, Err(BootconfError::Args(_))));
    }

    #[test]
    fn prefixed_env_and_typed_fields() {
        let dir = TempDir::new().unwrap();
        let mut config = AllKinds::default();
        let outcome = Bootconf::builder::<AllKinds>()
            .default_config_dir(dir.path().to_str().unwrap())
            .env_prefix("SVC")
            .env_vars([("SVC_WORKERS", "12"), ("SVC_IDLE_TIMEOUT", "90s")])
            .args(["app", "-w", "3", "--ratio", "0.1"])
            .load_into(&mut config)
            .unwrap();
        assert_eq!(outcome, Outcome::Loaded);
        assert_eq!(config.workers, 3);
        assert_eq!(config.ratio, 0.1);
        assert_eq!(config.idle, Some(Duration::from_secs(90)));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.verbose);
    }

    #[test]
    fn strict_mode_rejects_unknown_file_key() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "typo = 1\n").unwrap();
        let mut config = TitleConfig::default();
        let result = builder_in(&dir)
            .strict(true)
            .args(["app"])
            .load_into(&mut config);
        assert!(matches!(result, Err(BootconfError::UnknownKeys(_))));
    }
}
