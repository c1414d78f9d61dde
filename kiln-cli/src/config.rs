use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use kiln_core::SiteConfig;
use kiln_server::SecretConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "./kiln.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KilnConfig {
    pub build: BuildConfig,
    pub site: SiteConfig,
    pub secret: SecretConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Content directory, one subdirectory per kind
    pub source: String,
    /// Output directory for generated site
    pub output: String,
    /// Theme directory
    pub theme: String,
    /// Configuration file path
    pub config: String,
    /// Host for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
    /// Rebuild when content changes while serving
    pub watch: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "./content".to_string(),
            output: "./out".to_string(),
            theme: "./theme".to_string(),
            config: DEFAULT_CONFIG_FILE.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
            watch: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl KilnConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (KILN__SECTION__KEY)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        Self::load_with_env(args, Environment::with_prefix("KILN"))
    }

    fn load_with_env(args: &ArgMatches, env: Environment) -> Result<Self> {
        let config_file =
            string_arg(args, "config").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(ConfigBuilder::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        // 3. Add environment variables, double underscore between segments
        builder = builder.add_source(
            env.prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // 4. Override with CLI arguments that are defined and given for this command
        let mut cli_overrides = HashMap::new();

        for (arg, key) in [
            ("source", "build.source"),
            ("output", "build.output"),
            ("theme", "build.theme"),
            ("host", "build.host"),
            ("origin", "site.origin"),
            ("log-level", "logging.level"),
        ] {
            if let Some(value) = string_arg(args, arg) {
                cli_overrides.insert(key.to_string(), value);
            }
        }
        cli_overrides.insert("build.config".to_string(), config_file);
        if let Some(port) = string_arg(args, "port")
            && let Ok(port_num) = port.parse::<u16>()
        {
            cli_overrides.insert("build.port".to_string(), port_num.to_string());
        }
        for (flag, key) in [("open", "build.open"), ("watch", "build.watch")] {
            if flag_arg(args, flag) {
                cli_overrides.insert(key.to_string(), "true".to_string());
            }
        }

        builder = builder.add_source(ConfigBuilder::try_from(&cli_overrides)?);

        // Build and deserialize
        let config = builder.build()?;
        let kiln_config: KilnConfig = config.try_deserialize()?;
        kiln_config.site.check()?;

        Ok(kiln_config)
    }
}

/// Value of a string argument, or `None` when the command does not define
/// it or it was not given.
fn string_arg(args: &ArgMatches, name: &str) -> Option<String> {
    args.try_get_one::<String>(name).ok().flatten().cloned()
}

fn flag_arg(args: &ArgMatches, name: &str) -> bool {
    args.try_get_one::<bool>(name)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}
