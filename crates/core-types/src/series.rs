use crate::enums::TradeSide;
use serde::Serialize;

/// Timestamps are epoch seconds at full precision.
pub type Timestamp = f64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub timestamp: Timestamp,
    pub price: f64,
    pub quantity: f64,
    pub side: TradeSide,
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadPoint {
    pub timestamp: Timestamp,
    pub spread: f64,
}

/// One agent's profit and position at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfitSnapshot {
    pub timestamp: Timestamp,
    pub agent_id: String,
    pub realized_profit: f64,
    pub unrealized_profit: f64,
    pub total_profit: f64,
    pub capital: Option<f64>,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeDetection {
    pub timestamp: Timestamp,
    pub regime: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusSignal {
    pub timestamp: Timestamp,
    pub signal: String,
    pub confidence: Option<f64>,
    pub agent_count: Option<u64>,
}

/// Everything recorded for one traded symbol during a simulation.
///
/// Each sequence is ordered by timestamp ascending with ties kept in input order, and
/// `prices` is never empty once the series is part of a normalized report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSeries {
    pub prices: Vec<PricePoint>,
    pub trades: Vec<TradeEvent>,
    pub spreads: Vec<SpreadPoint>,
    pub agent_profits: Vec<AgentProfitSnapshot>,
    pub regime_detections: Vec<RegimeDetection>,
    pub consensus_signals: Vec<ConsensusSignal>,
}

/// Stable ascending sort on a timestamp key; equal timestamps keep their input order.
pub fn sort_by_timestamp<T>(items: &mut [T], timestamp: impl Fn(&T) -> Timestamp) {
    items.sort_by(|a, b| timestamp(a).total_cmp(&timestamp(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_timestamps_keep_input_order() {
        let mut points = vec![
            SpreadPoint { timestamp: 2.0, spread: 0.1 },
            SpreadPoint { timestamp: 1.0, spread: 0.2 },
            SpreadPoint { timestamp: 2.0, spread: 0.3 },
            SpreadPoint { timestamp: 1.0, spread: 0.4 },
        ];
        sort_by_timestamp(&mut points, |p| p.timestamp);
        let spreads: Vec<f64> = points.iter().map(|p| p.spread).collect();
        assert_eq!(spreads, vec![0.2, 0.4, 0.1, 0.3]);
    }
}
