use crate::enums::{ReportKind, SourceFamily};
use crate::series::SymbolSeries;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The canonical view model every raw payload family is projected into.
///
/// Counters default to zero when the source omits them; the `kind`-specific payload is
/// flattened next to the common fields and tagged with `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReport {
    pub id: String,
    /// The artifact key this report was read from, usable as a `reportId`.
    pub artifact: String,
    pub source: SourceFamily,
    pub generated_at: Option<String>,
    pub duration_seconds: f64,
    pub total_trades: u64,
    pub total_volume: f64,
    #[serde(flatten)]
    pub payload: ReportPayload,
}

impl NormalizedReport {
    pub fn kind(&self) -> ReportKind {
        match self.payload {
            ReportPayload::Simulation { .. } => ReportKind::Simulation,
            ReportPayload::Backtest { .. } => ReportKind::Backtest,
        }
    }

    pub fn symbol_series(&self, symbol: &str) -> Option<&SymbolSeries> {
        match &self.payload {
            ReportPayload::Simulation { per_symbol_series, .. } => per_symbol_series.get(symbol),
            ReportPayload::Backtest { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportPayload {
    #[serde(rename_all = "camelCase")]
    Simulation {
        per_symbol_series: BTreeMap<String, SymbolSeries>,
        diagnostics: SimulationDiagnostics,
    },
    #[serde(rename_all = "camelCase")]
    Backtest {
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        symbols: Vec<String>,
        per_agent_summary: BTreeMap<String, AgentSummary>,
    },
}

/// Validation and telemetry blocks the dashboard renders verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationDiagnostics {
    pub fact_check_stats: Option<Value>,
    pub agent_metrics: Option<Value>,
    pub validation: Option<Value>,
    pub market_data: Option<Value>,
}

/// Per-agent performance summary.
///
/// Ratios stay `None` when unknown so "zero" and "missing" remain distinguishable. The
/// simulation-only fields are derived from profit telemetry, never read from the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub agent_id: String,
    pub total_return_pct: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
    pub total_trades: u64,
    pub final_profit: Option<f64>,
    pub max_profit: Option<f64>,
    pub min_profit: Option<f64>,
    pub trade_count: Option<u64>,
    pub final_state: Option<AgentFinalState>,
}

/// The authoritative last-known state of a simulated agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFinalState {
    pub realized_profit: f64,
    pub unrealized_profit: f64,
    pub total_profit: f64,
    pub capital: Option<f64>,
    pub position: f64,
}
