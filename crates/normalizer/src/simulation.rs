use crate::fields::{
    array_at, counter_at, first, generated_at, number_at, text_at, timestamp_at,
};
use crate::SourceHint;
use core_types::{
    sort_by_timestamp, AgentProfitSnapshot, ConsensusSignal, NormalizedReport, PricePoint,
    RegimeDetection, ReportPayload, SimulationDiagnostics, SourceFamily, SpreadPoint,
    SymbolSeries, TradeEvent, TradeSide,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const TIMESTAMP: &[&str] = &["timestamp", "time", "t"];

pub(crate) fn project(
    raw: &Value,
    time_series: &Map<String, Value>,
    hint: &SourceHint,
) -> NormalizedReport {
    let source = match hint.expected {
        SourceFamily::Horizon(horizon) => SourceFamily::Horizon(horizon),
        SourceFamily::Live | SourceFamily::Backtest => SourceFamily::Live,
    };

    let id = text_at(raw, &["simulation_id", "experiment", "/results/simulation_id"])
        .unwrap_or_else(|| hint.artifact.clone());

    let mut per_symbol_series = BTreeMap::new();
    for (symbol, block) in time_series {
        let series = symbol_series(block);
        if series.prices.is_empty() {
            tracing::debug!(artifact = %hint.artifact, %symbol, "Dropping symbol without price samples.");
            continue;
        }
        per_symbol_series.insert(symbol.clone(), series);
    }

    let diagnostics = SimulationDiagnostics {
        fact_check_stats: first(raw, &["fact_check_stats", "/results/fact_check_stats"]).cloned(),
        agent_metrics: first(raw, &["agent_metrics", "/results/agent_metrics"]).cloned(),
        validation: first(raw, &["validation", "/results/validation", "/results/fact_check"]).cloned(),
        market_data: first(raw, &["/results/market_data", "market_data"]).cloned(),
    };

    NormalizedReport {
        id,
        artifact: hint.artifact.clone(),
        source,
        generated_at: generated_at(raw, &["generated_at", "timestamp", "/results/generated_at"]),
        duration_seconds: number_at(raw, &["duration", "duration_seconds", "/results/duration"])
            .unwrap_or(0.0),
        total_trades: counter_at(raw, &["total_trades", "/results/total_trades"]),
        total_volume: number_at(raw, &["total_volume", "/results/total_volume"]).unwrap_or(0.0),
        payload: ReportPayload::Simulation { per_symbol_series, diagnostics },
    }
}

fn symbol_series(block: &Value) -> SymbolSeries {
    let mut series = SymbolSeries {
        prices: records(block, &["prices", "price_history"], price_point),
        trades: records(block, &["trades", "trade_history"], trade_event),
        spreads: records(block, &["spreads", "spread_history"], spread_point),
        agent_profits: records(block, &["agent_profits", "profits"], agent_profit),
        regime_detections: records(block, &["regime_detections", "regimes"], regime_detection),
        consensus_signals: records(block, &["consensus_signals", "consensus"], consensus_signal),
    };
    sort_by_timestamp(&mut series.prices, |p| p.timestamp);
    sort_by_timestamp(&mut series.trades, |t| t.timestamp);
    sort_by_timestamp(&mut series.spreads, |s| s.timestamp);
    sort_by_timestamp(&mut series.agent_profits, |s| s.timestamp);
    sort_by_timestamp(&mut series.regime_detections, |r| r.timestamp);
    sort_by_timestamp(&mut series.consensus_signals, |c| c.timestamp);
    series
}

/// Projects every record that parses; the rest are skipped.
fn records<T>(block: &Value, aliases: &[&str], parse: fn(&Value) -> Option<T>) -> Vec<T> {
    let raw = array_at(block, aliases);
    let parsed: Vec<T> = raw.iter().filter_map(parse).collect();
    if parsed.len() < raw.len() {
        tracing::trace!(series = aliases[0], skipped = raw.len() - parsed.len(), "Skipped unusable records.");
    }
    parsed
}

fn price_point(record: &Value) -> Option<PricePoint> {
    Some(PricePoint {
        timestamp: timestamp_at(record, TIMESTAMP)?,
        price: number_at(record, &["price", "mid_price", "close"])?,
    })
}

fn trade_event(record: &Value) -> Option<TradeEvent> {
    let side = first(record, &["side", "aggressor_side"])?.as_str().and_then(TradeSide::parse_loose)?;
    Some(TradeEvent {
        timestamp: timestamp_at(record, TIMESTAMP)?,
        price: number_at(record, &["price"])?,
        quantity: number_at(record, &["quantity", "size", "volume"]).unwrap_or(0.0),
        side,
        agent_id: text_at(record, &["agent_id", "agent"]),
    })
}

fn spread_point(record: &Value) -> Option<SpreadPoint> {
    Some(SpreadPoint {
        timestamp: timestamp_at(record, TIMESTAMP)?,
        spread: number_at(record, &["spread"])?,
    })
}

fn agent_profit(record: &Value) -> Option<AgentProfitSnapshot> {
    let timestamp = timestamp_at(record, TIMESTAMP)?;
    let agent_id = text_at(record, &["agent_id", "agent"])?;
    let realized_profit = number_at(record, &["realized_profit", "realized_pnl"]).unwrap_or(0.0);
    let unrealized_profit = number_at(record, &["unrealized_profit", "unrealized_pnl"]).unwrap_or(0.0);
    Some(AgentProfitSnapshot {
        timestamp,
        agent_id,
        realized_profit,
        unrealized_profit,
        total_profit: number_at(record, &["total_profit", "total_pnl"])
            .unwrap_or(realized_profit + unrealized_profit),
        capital: number_at(record, &["capital", "cash"]),
        position: number_at(record, &["position"]).unwrap_or(0.0),
    })
}

fn regime_detection(record: &Value) -> Option<RegimeDetection> {
    Some(RegimeDetection {
        timestamp: timestamp_at(record, TIMESTAMP)?,
        regime: text_at(record, &["regime", "label"])?,
        confidence: number_at(record, &["confidence"]),
    })
}

fn consensus_signal(record: &Value) -> Option<ConsensusSignal> {
    Some(ConsensusSignal {
        timestamp: timestamp_at(record, TIMESTAMP)?,
        signal: text_at(record, &["signal", "consensus", "direction"])?,
        confidence: number_at(record, &["confidence", "strength"]),
        agent_count: first(record, &["agent_count", "num_agents"])
            .and_then(crate::fields::number)
            .map(|n| n.max(0.0) as u64),
    })
}
