//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! 1. built-in defaults (`Default` impls below)
//! 2. `config/default.*` and `config/local.*` (both optional)
//! 3. an explicit file passed with `--config` (must exist)
//! 4. environment variables prefixed with `COMPS__`,
//!    e.g. `COMPS__ENGINE__HISTOGRAM_BINS=20` -> `engine.histogram_bins`
//!
//! CLI flags are applied on top by `app`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::engine::EngineSettings;
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub dataset: DatasetSettings,
    pub logging: LoggingSettings,
}

/// Where the reference sales come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Sales CSV. When absent a seeded synthetic sample is generated instead.
    pub path: Option<PathBuf>,
    pub sample_count: usize,
    pub sample_seed: u64,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: None,
            sample_count: 500,
            sample_seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Full,
}

impl Settings {
    /// Load settings from the standard locations plus an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        Self::build(explicit, "config")
            .map_err(|e| AppError::config(format!("Failed to load configuration: {e}")))
    }

    fn build(explicit: Option<&Path>, dir: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(&format!("{dir}/default")).required(false))
            .add_source(File::with_name(&format!("{dir}/local")).required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix("COMPS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
