//! # Vizfolio Configuration
//!
//! Strongly typed settings for the results pipeline and its HTTP surface, plus the shared
//! logging bootstrap.
//!
//! Sources, later overriding earlier: built-in defaults, an optional TOML file
//! (`vizfolio.toml` unless another path is given) and `VIZFOLIO_<SECTION>__<KEY>`
//! environment variables.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    BacktestSettings, LoggingSettings, PathSettings, PresentationSettings, ServerSettings,
    Settings,
};

pub const DEFAULT_CONFIG_FILE: &str = "vizfolio.toml";
const ENV_PREFIX: &str = "VIZFOLIO";

/// Command-line overrides shared by every binary that loads settings.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured log filter (e.g. "debug" or "query=trace").
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[cfg(feature = "clap")]
impl ConfigArgs {
    /// Loads settings from the selected file and applies the command-line overrides.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut settings = load_settings(self.config.as_deref())?;
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
        Ok(settings)
    }
}

/// Loads and validates the application settings.
///
/// A missing file is not an error (defaults apply); an unreadable or invalid one is.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;

    Ok(settings)
}

/// Rejects settings that would make the pipeline behave ambiguously.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.server.port == 0 {
        return Err(ConfigError::ValidationError("server.port must be non-zero".to_string()));
    }

    let backtest = &settings.backtest;
    match (backtest.start_date, backtest.end_date) {
        (Some(start), Some(end)) if start > end => {
            return Err(ConfigError::ValidationError(format!(
                "backtest.start_date ({start}) is after backtest.end_date ({end})"
            )));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(ConfigError::ValidationError(
                "backtest.start_date and backtest.end_date must be set together".to_string(),
            ));
        }
        _ => {}
    }

    if settings.presentation.trading_agent_prefixes.is_empty() {
        return Err(ConfigError::ValidationError(
            "presentation.trading_agent_prefixes must name at least one prefix".to_string(),
        ));
    }

    Ok(())
}
