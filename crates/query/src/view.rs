use analytics::{
    aggregate_profits, align, round_summary, AlignedSeries, AnalyticsError, PivotedSeries,
};
use chrono::NaiveDate;
use core_types::{
    AgentSummary, ConsensusSignal, NormalizedReport, RegimeDetection, ReportKind, ReportPayload,
    SimulationDiagnostics, SourceFamily, SpreadPoint, SymbolSeries,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// The fields every report view shares.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHeader {
    pub id: String,
    pub report_id: String,
    pub source: SourceFamily,
    pub generated_at: Option<String>,
    pub duration_seconds: f64,
    pub total_trades: u64,
    pub total_volume: f64,
}

impl From<&NormalizedReport> for ReportHeader {
    fn from(report: &NormalizedReport) -> Self {
        Self {
            id: report.id.clone(),
            report_id: report.artifact.clone(),
            source: report.source,
            generated_at: report.generated_at.clone(),
            duration_seconds: report.duration_seconds,
            total_trades: report.total_trades,
            total_volume: report.total_volume,
        }
    }
}

/// A report ready to render, tagged with `kind` so consumers branch once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportView {
    Simulation {
        #[serde(flatten)]
        header: ReportHeader,
        diagnostics: SimulationDiagnostics,
        slices: BTreeMap<String, SymbolSlice>,
    },
    #[serde(rename_all = "camelCase")]
    Backtest {
        #[serde(flatten)]
        header: ReportHeader,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        symbols: Vec<String>,
        /// Agents ranked by total return, best first; display-rounded.
        ranking: Vec<AgentSummary>,
    },
}

impl ReportView {
    /// Builds the view for a normalized report, slicing every symbol in parallel.
    pub fn build(report: &NormalizedReport) -> Result<Self, AnalyticsError> {
        let header = ReportHeader::from(report);
        match &report.payload {
            ReportPayload::Simulation { per_symbol_series, diagnostics } => {
                let slices = per_symbol_series
                    .par_iter()
                    .map(|(symbol, series)| {
                        SymbolSlice::build(&report.artifact, symbol, series).map(|s| (symbol.clone(), s))
                    })
                    .collect::<Result<BTreeMap<_, _>, AnalyticsError>>()?;
                Ok(Self::Simulation { header, diagnostics: diagnostics.clone(), slices })
            }
            ReportPayload::Backtest { start_date, end_date, symbols, per_agent_summary } => {
                let mut ranked: Vec<&AgentSummary> = per_agent_summary.values().collect();
                // Agents without a return sort last; ties keep agent-id order.
                ranked.sort_by(|a, b| {
                    let key = |s: &AgentSummary| s.total_return_pct.unwrap_or(f64::NEG_INFINITY);
                    key(*b).total_cmp(&key(*a))
                });
                let ranking = ranked.into_iter().map(round_summary).collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Backtest {
                    header,
                    start_date: *start_date,
                    end_date: *end_date,
                    symbols: symbols.clone(),
                    ranking,
                })
            }
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Simulation { .. } => ReportKind::Simulation,
            Self::Backtest { .. } => ReportKind::Backtest,
        }
    }

    pub fn header(&self) -> &ReportHeader {
        match self {
            Self::Simulation { header, .. } | Self::Backtest { header, .. } => header,
        }
    }
}

/// Everything the dashboard draws for one symbol of a simulation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSlice {
    pub report_id: String,
    pub symbol: String,
    /// Prices with attached buy/sell trade markers, display-rounded.
    pub price_series: AlignedSeries,
    pub spreads: Vec<SpreadPoint>,
    pub profit_series: PivotedSeries,
    pub realized_profit_series: PivotedSeries,
    /// Agents ranked by final total profit, display-rounded.
    pub agents: Vec<AgentSummary>,
    pub regime_detections: Vec<RegimeDetection>,
    pub consensus_signals: Vec<ConsensusSignal>,
    pub trade_count: usize,
}

impl SymbolSlice {
    pub fn build(report_id: &str, symbol: &str, series: &SymbolSeries) -> Result<Self, AnalyticsError> {
        let roster = trading_roster(series);
        let aggregation = aggregate_profits(&series.agent_profits, &roster, &series.trades);

        Ok(Self {
            report_id: report_id.to_string(),
            symbol: symbol.to_string(),
            price_series: align(&series.prices, &series.trades).rounded()?,
            spreads: series.spreads.clone(),
            profit_series: aggregation.series.rounded()?,
            realized_profit_series: aggregation.realized.rounded()?,
            agents: aggregation.summary.iter().map(round_summary).collect::<Result<_, _>>()?,
            regime_detections: series.regime_detections.clone(),
            consensus_signals: series.consensus_signals.clone(),
            trade_count: series.trades.len(),
        })
    }
}

/// Agents that traded the symbol, in first-trade order.
fn trading_roster(series: &SymbolSeries) -> Vec<String> {
    let mut roster: Vec<String> = Vec::new();
    for agent in series.trades.iter().filter_map(|t| t.agent_id.as_ref()) {
        if !roster.contains(agent) {
            roster.push(agent.clone());
        }
    }
    roster
}
