use chrono::NaiveDate;
use core_types::Horizon;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so the service starts with no configuration file at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub paths: PathSettings,
    pub backtest: BacktestSettings,
    pub presentation: PresentationSettings,
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer (the frontend dev servers by default).
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

/// Where artifacts and catalog files live, relative to whichever base directory resolves.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub results_dir: PathBuf,
    pub stories_dir: PathBuf,
    pub viz_data_dir: PathBuf,
    pub viz_static_dir: PathBuf,
    /// An explicit project root. When unset, the nearest ancestor holding a root marker is used.
    pub project_root: Option<PathBuf>,
    pub root_markers: Vec<String>,
}

/// The preferred backtest range for the dashboard. Both dates or neither.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl BacktestSettings {
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

/// Presentation policy applied while normalizing reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresentationSettings {
    pub default_horizon: Horizon,
    /// Backtest agents are surfaced only when their id starts with one of these.
    pub trading_agent_prefixes: Vec<String>,
    /// ...and with none of these (market makers, oracles).
    pub excluded_agent_prefixes: Vec<String>,
    /// Keep decoded artifacts in memory, invalidated by file modification time.
    pub artifact_cache: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            stories_dir: PathBuf::from("data/viz/stories"),
            viz_data_dir: PathBuf::from("data/viz/data"),
            viz_static_dir: PathBuf::from("data/viz/static"),
            project_root: None,
            root_markers: vec!["Cargo.toml".to_string(), ".git".to_string()],
        }
    }
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            default_horizon: Horizon::ThirtyMinutes,
            trading_agent_prefixes: [
                "trader",
                "agent",
                "llm",
                "momentum",
                "mean_reversion",
                "arbitrage",
            ]
            .map(String::from)
            .to_vec(),
            excluded_agent_prefixes: ["market_maker", "oracle", "liquidity"].map(String::from).to_vec(),
            artifact_cache: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "vizfolio.log".to_string(),
        }
    }
}
