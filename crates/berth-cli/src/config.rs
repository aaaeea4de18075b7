//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only receives the values it needs
//! (`ContainerRuntime`, `HealthCheckBudget`, template directory).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `BERTH_<SECTION>__<KEY>`, e.g.
//!    `BERTH_HEALTH_CHECK__MAX_ATTEMPTS=10`
//! 3. `--config <FILE>` (must exist)
//! 4. `./.berth.toml`
//! 5. The global file at [`AppConfig::config_path`]
//! 6. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::ValueEnum;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use berth_core::domain::{ContainerRuntime, HealthCheckBudget};

use crate::cli::OutputFormat;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "BERTH";

/// Name of the per-project config file.
pub const LOCAL_CONFIG_FILE: &str = ".berth.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Container strategy settings.
    pub container: ContainerConfig,
    /// Readiness polling budget.
    pub health_check: HealthCheckConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Template settings.
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Try containers before local services.
    pub enabled: bool,
    /// Orchestration binary (`docker`, `podman`, ...).
    pub runtime: String,
    pub start_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// Keep the admin-UI sidecar in generated manifests.
    pub admin_ui: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        let runtime = ContainerRuntime::default();
        Self {
            enabled: true,
            runtime: runtime.binary,
            start_timeout_secs: runtime.start_timeout_secs,
            probe_timeout_secs: runtime.probe_timeout_secs,
            admin_ui: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    pub max_attempts: u32,
    pub interval_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        let budget = HealthCheckBudget::default();
        Self {
            max_attempts: budget.max_attempts,
            interval_secs: budget.interval_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--output-format` wins when given.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory of `<service>.yml` overrides.
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from files and the environment.
    ///
    /// `config_file` is the path passed via `--config`; it must exist when
    /// given.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&Self::default()).context("encoding defaults")?)
            .add_source(File::from(Self::config_path()).required(false))
            .add_source(File::from(Path::new(LOCAL_CONFIG_FILE)).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("reading configuration sources")?
            .try_deserialize()
            .context("parsing configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Load from a single TOML file layered over the defaults, without
    /// consulting the environment or the standard locations.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default()).context("encoding defaults")?)
            .add_source(File::from(path).required(true))
            .build()
            .with_context(|| format!("reading {}", path.display()))?
            .try_deserialize()
            .context("parsing configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the core would refuse later.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.runtime().validate().context("invalid [container] settings")?;
        self.budget()
            .validate()
            .context("invalid [health_check] settings")?;
        if OutputFormat::from_str(&self.output.format, true).is_err() {
            bail!(
                "invalid [output] settings: unknown format '{}'",
                self.output.format
            );
        }
        Ok(())
    }

    /// Configured output format; `Auto` when unset or unrecognised.
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.output.format, true).unwrap_or_default()
    }

    /// Container runtime settings for the lifecycle controller.
    pub fn runtime(&self) -> ContainerRuntime {
        ContainerRuntime {
            binary: self.container.runtime.clone(),
            start_timeout_secs: self.container.start_timeout_secs,
            probe_timeout_secs: self.container.probe_timeout_secs,
        }
    }

    /// Health-check budget for the orchestrator.
    pub fn budget(&self) -> HealthCheckBudget {
        HealthCheckBudget {
            max_attempts: self.health_check.max_attempts,
            interval_secs: self.health_check.interval_secs,
        }
    }

    /// Render as pretty TOML (used by `init` and `config list`).
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("serialising configuration")
    }

    /// Look up a dotted key such as `health_check.max_attempts`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        let found = key
            .split('.')
            .try_fold(&value, |node, part| node.get(part))?;

        match found {
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.berth.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "berth", "berth")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }
}
