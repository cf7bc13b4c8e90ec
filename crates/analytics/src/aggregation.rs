use crate::error::AnalyticsError;
use crate::rounding::round_2dp;
use core_types::{
    sort_by_timestamp, AgentFinalState, AgentProfitSnapshot, AgentSummary, Timestamp, TradeEvent,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One timestamp of a pivoted profit series. Agents without a snapshot at this instant are
/// absent from `values` rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// A wide table with one column per agent, in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotedSeries {
    pub agents: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotedSeries {
    pub fn rounded(&self) -> Result<PivotedSeries, AnalyticsError> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let values = row
                    .values
                    .iter()
                    .map(|(agent, v)| Ok((agent.clone(), round_2dp("profit", *v)?)))
                    .collect::<Result<BTreeMap<_, _>, AnalyticsError>>()?;
                Ok(PivotRow { timestamp: row.timestamp, values })
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;
        Ok(PivotedSeries { agents: self.agents.clone(), rows })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAggregation {
    /// `total_profit` per agent over time.
    pub series: PivotedSeries,
    /// `realized_profit` per agent over time.
    pub realized: PivotedSeries,
    /// Per-agent summaries ranked by final total profit, best first.
    pub summary: Vec<AgentSummary>,
}

/// Pivots profit telemetry per agent and derives each agent's summary.
///
/// `roster` names agents that should appear in the summary even without telemetry; they are
/// reported with zero final, max and min profit. All arithmetic is at full precision.
pub fn aggregate_profits(
    snapshots: &[AgentProfitSnapshot],
    roster: &[String],
    trades: &[TradeEvent],
) -> ProfitAggregation {
    let mut agents: Vec<String> = Vec::new();
    for id in snapshots.iter().map(|s| &s.agent_id) {
        if !agents.contains(id) {
            agents.push(id.clone());
        }
    }

    let mut ordered: Vec<&AgentProfitSnapshot> = snapshots.iter().collect();
    sort_by_timestamp(&mut ordered, |s| s.timestamp);

    let series = pivot(&agents, &ordered, |s| s.total_profit);
    let realized = pivot(&agents, &ordered, |s| s.realized_profit);

    let mut trade_counts: HashMap<&str, u64> = HashMap::new();
    for agent_id in trades.iter().filter_map(|t| t.agent_id.as_deref()) {
        *trade_counts.entry(agent_id).or_default() += 1;
    }

    let mut roster_order = agents.clone();
    for id in roster {
        if !roster_order.contains(id) {
            roster_order.push(id.clone());
        }
    }

    let mut summary: Vec<AgentSummary> = roster_order
        .iter()
        .map(|agent_id| {
            let history: Vec<&AgentProfitSnapshot> =
                ordered.iter().copied().filter(|s| &s.agent_id == agent_id).collect();
            let trade_count = trade_counts.get(agent_id.as_str()).copied().unwrap_or(0);
            summarize(agent_id, &history, trade_count)
        })
        .collect();

    // Stable: equal final profits keep encounter order.
    summary.sort_by(|a, b| final_profit(b).total_cmp(&final_profit(a)));

    ProfitAggregation { series, realized, summary }
}

fn final_profit(summary: &AgentSummary) -> f64 {
    summary.final_profit.unwrap_or(0.0)
}

fn summarize(agent_id: &str, history: &[&AgentProfitSnapshot], trade_count: u64) -> AgentSummary {
    let final_state = history.last().map(|last| AgentFinalState {
        realized_profit: last.realized_profit,
        unrealized_profit: last.unrealized_profit,
        total_profit: last.total_profit,
        capital: last.capital,
        position: last.position,
    });
    let totals = history.iter().map(|s| s.total_profit);
    let (max_profit, min_profit) = if history.is_empty() {
        (0.0, 0.0)
    } else {
        (totals.clone().fold(f64::NEG_INFINITY, f64::max), totals.fold(f64::INFINITY, f64::min))
    };

    AgentSummary {
        agent_id: agent_id.to_string(),
        total_trades: trade_count,
        final_profit: Some(final_state.map(|s| s.total_profit).unwrap_or(0.0)),
        max_profit: Some(max_profit),
        min_profit: Some(min_profit),
        trade_count: Some(trade_count),
        final_state,
        ..AgentSummary::default()
    }
}

/// Groups time-ordered snapshots into one row per distinct timestamp. A repeated
/// agent/timestamp pair keeps the later snapshot.
fn pivot(
    agents: &[String],
    ordered: &[&AgentProfitSnapshot],
    value: impl Fn(&AgentProfitSnapshot) -> f64,
) -> PivotedSeries {
    let mut rows: Vec<PivotRow> = Vec::new();
    for snapshot in ordered {
        match rows.last_mut() {
            Some(row) if row.timestamp == snapshot.timestamp => {
                row.values.insert(snapshot.agent_id.clone(), value(snapshot));
            }
            _ => rows.push(PivotRow {
                timestamp: snapshot.timestamp,
                values: BTreeMap::from([(snapshot.agent_id.clone(), value(snapshot))]),
            }),
        }
    }
    PivotedSeries { agents: agents.to_vec(), rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::TradeSide;
    use serde_json::json;

    fn snap(timestamp: f64, agent_id: &str, total_profit: f64) -> AgentProfitSnapshot {
        AgentProfitSnapshot {
            timestamp,
            agent_id: agent_id.to_string(),
            realized_profit: total_profit / 2.0,
            unrealized_profit: total_profit / 2.0,
            total_profit,
            capital: None,
            position: 0.0,
        }
    }

    fn trade_by(agent_id: &str) -> TradeEvent {
        TradeEvent { timestamp: 0.0, price: 1.0, quantity: 1.0, side: TradeSide::Buy, agent_id: Some(agent_id.into()) }
    }

    #[test]
    fn final_max_and_min_follow_the_history() {
        let snaps = [snap(1.0, "a1", 5.0), snap(2.0, "a1", -2.0), snap(3.0, "a1", 3.0)];
        let agg = aggregate_profits(&snaps, &[], &[trade_by("a1"), trade_by("a1")]);

        let a1 = &agg.summary[0];
        assert_eq!(a1.final_profit, Some(3.0));
        assert_eq!(a1.max_profit, Some(5.0));
        assert_eq!(a1.min_profit, Some(-2.0));
        assert_eq!(a1.trade_count, Some(2));
        assert_eq!(a1.final_state.map(|s| s.realized_profit), Some(1.5));
    }

    #[test]
    fn final_state_is_taken_at_the_latest_timestamp_not_the_last_record() {
        let snaps = [snap(9.0, "a1", 4.0), snap(1.0, "a1", 100.0)];
        let agg = aggregate_profits(&snaps, &[], &[]);
        assert_eq!(agg.summary[0].final_profit, Some(4.0));
        assert_eq!(agg.summary[0].max_profit, Some(100.0));
    }

    #[test]
    fn roster_agents_without_telemetry_report_zeros() {
        let agg = aggregate_profits(&[snap(1.0, "a1", -1.0)], &["ghost".to_string()], &[]);
        let ghost = agg.summary.iter().find(|s| s.agent_id == "ghost").unwrap();
        assert_eq!(
            (ghost.final_profit, ghost.max_profit, ghost.min_profit, ghost.trade_count),
            (Some(0.0), Some(0.0), Some(0.0), Some(0))
        );
        assert_eq!(ghost.final_state, None);
        assert_eq!(agg.summary[0].agent_id, "ghost");
    }

    #[test]
    fn ranking_is_stable_for_equal_profits() {
        let snaps = [snap(1.0, "b", 2.0), snap(1.0, "a", 2.0), snap(1.0, "c", 7.0)];
        let agg = aggregate_profits(&snaps, &[], &[]);
        let order: Vec<_> = agg.summary.iter().map(|s| s.agent_id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn pivot_keeps_missing_pairs_absent() {
        let snaps = [snap(2.0, "b", 1.0), snap(1.0, "a", 3.0), snap(2.0, "a", 4.0)];
        let agg = aggregate_profits(&snaps, &[], &[]);

        assert_eq!(agg.series.agents, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(agg.series.rows.len(), 2);
        assert_eq!(agg.series.rows[0].values.len(), 1);
        assert_eq!(
            serde_json::to_value(&agg.series.rows[1]).unwrap(),
            json!({"timestamp": 2.0, "a": 4.0, "b": 1.0})
        );
        assert_eq!(agg.realized.rows[1].values["a"], 2.0);
    }

    #[test]
    fn rounded_pivot_is_a_display_copy() {
        let agg = aggregate_profits(&[snap(1.0, "a", 1.23456)], &[], &[]);
        let shown = agg.series.rounded().unwrap();
        assert_eq!(shown.rows[0].values["a"], 1.23);
        assert_eq!(agg.series.rows[0].values["a"], 1.23456);
    }
}
