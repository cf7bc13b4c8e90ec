use crate::fields::{counter_at, date_at, first, generated_at, number_at, object_at, text};
use crate::participants::TradingParticipantFilter;
use crate::SourceHint;
use core_types::{AgentSummary, NormalizedReport, ReportPayload, SourceFamily};
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) fn project(
    raw: &Value,
    hint: &SourceHint,
    participants: &TradingParticipantFilter,
) -> Result<NormalizedReport, String> {
    let id = first(raw, &["backtest_id"])
        .and_then(text)
        .ok_or_else(|| "'backtest_id' must be a string or a number".to_string())?;
    let summary = object_at(raw, &["summary"])
        .ok_or_else(|| "'summary' must be an object keyed by agent id".to_string())?;

    let start_date = date_at(raw, &["start_date"]);
    let end_date = date_at(raw, &["end_date"]);
    let duration_seconds = match (start_date, end_date) {
        (Some(start), Some(end)) => (end - start).num_seconds() as f64,
        _ => 0.0,
    };

    let symbols = first(raw, &["symbols"])
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(text).collect())
        .unwrap_or_default();

    let mut per_agent_summary = BTreeMap::new();
    for (agent_id, stats) in summary {
        if !participants.is_trading_participant(agent_id) {
            tracing::trace!(%agent_id, "Skipping non-trading backtest agent.");
            continue;
        }
        per_agent_summary.insert(agent_id.clone(), agent_summary(agent_id, stats));
    }

    Ok(NormalizedReport {
        id,
        artifact: hint.artifact.clone(),
        source: SourceFamily::Backtest,
        generated_at: generated_at(raw, &["generated_at", "timestamp"]),
        duration_seconds,
        total_trades: counter_at(raw, &["total_trades"]),
        total_volume: number_at(raw, &["total_volume"]).unwrap_or(0.0),
        payload: ReportPayload::Backtest { start_date, end_date, symbols, per_agent_summary },
    })
}

fn agent_summary(agent_id: &str, stats: &Value) -> AgentSummary {
    AgentSummary {
        agent_id: agent_id.to_string(),
        total_return_pct: number_at(stats, &["total_return", "total_return_pct"]),
        sharpe_ratio: number_at(stats, &["sharpe_ratio", "sharpe"]),
        max_drawdown_pct: number_at(stats, &["max_drawdown", "max_drawdown_pct"]),
        total_trades: counter_at(stats, &["total_trades", "trades"]),
        ..AgentSummary::default()
    }
}
