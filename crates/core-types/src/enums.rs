use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Parses the loose side spellings emitted by the simulation engines.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" | "b" | "bid" => Some(TradeSide::Buy),
            "sell" | "s" | "ask" => Some(TradeSide::Sell),
            _ => None,
        }
    }
}

/// The fixed simulated duration a simulation report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "live")]
    Live,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hour")]
    OneHour,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Live, Horizon::ThirtyMinutes, Horizon::OneHour];

    /// The stable textual key, also the horizon's results sub-directory.
    pub fn key(&self) -> &'static str {
        match self {
            Horizon::Live => "live",
            Horizon::ThirtyMinutes => "30min",
            Horizon::OneHour => "1hour",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Horizon {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Horizon::Live),
            "30min" | "30m" | "30-minute" => Ok(Horizon::ThirtyMinutes),
            "1hour" | "1h" | "60min" | "1-hour" => Ok(Horizon::OneHour),
            other => Err(CoreError::UnknownHorizon(other.to_string())),
        }
    }
}

/// The discriminant consumers branch on when rendering a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Simulation,
    Backtest,
}

/// Which of the three raw payload families a report was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", content = "horizon", rename_all = "lowercase")]
pub enum SourceFamily {
    Live,
    Horizon(Horizon),
    Backtest,
}

impl SourceFamily {
    pub fn kind(&self) -> ReportKind {
        match self {
            SourceFamily::Live | SourceFamily::Horizon(_) => ReportKind::Simulation,
            SourceFamily::Backtest => ReportKind::Backtest,
        }
    }
}

/// The declared type of a visualization payload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VizPayloadType {
    Data,
    Plotly,
    Static,
}

impl FromStr for VizPayloadType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(VizPayloadType::Data),
            "plotly" => Ok(VizPayloadType::Plotly),
            "static" => Ok(VizPayloadType::Static),
            other => Err(CoreError::UnknownPayloadType(other.to_string())),
        }
    }
}
