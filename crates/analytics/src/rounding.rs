//! Presentation rounding. Everything upstream of these helpers works at full precision.

use crate::error::AnalyticsError;
use core_types::{AgentFinalState, AgentSummary};
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

pub const DISPLAY_DECIMALS: u32 = 2;

/// Rounds to two decimal places, half away from zero, in decimal arithmetic so that
/// `10.005` becomes `10.01` rather than falling victim to its binary representation.
///
/// Finite values beyond the `Decimal` range have no fractional digits left to round and are
/// returned as they are. Only NaN and infinities are rejected.
pub fn round_2dp(field: &'static str, value: f64) -> Result<f64, AnalyticsError> {
    let not_representable = || AnalyticsError::NotRepresentable { field, value };
    if !value.is_finite() {
        return Err(not_representable());
    }
    let Some(decimal) = Decimal::from_f64(value) else {
        return Ok(value);
    };
    decimal
        .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .ok_or_else(not_representable)
}

pub fn round_opt(field: &'static str, value: Option<f64>) -> Result<Option<f64>, AnalyticsError> {
    value.map(|v| round_2dp(field, v)).transpose()
}

/// A display copy of an agent summary; counts and identifiers are untouched.
pub fn round_summary(summary: &AgentSummary) -> Result<AgentSummary, AnalyticsError> {
    let final_state = summary
        .final_state
        .map(|state| -> Result<AgentFinalState, AnalyticsError> {
            Ok(AgentFinalState {
                realized_profit: round_2dp("realizedProfit", state.realized_profit)?,
                unrealized_profit: round_2dp("unrealizedProfit", state.unrealized_profit)?,
                total_profit: round_2dp("totalProfit", state.total_profit)?,
                capital: round_opt("capital", state.capital)?,
                position: state.position,
            })
        })
        .transpose()?;

    Ok(AgentSummary {
        agent_id: summary.agent_id.clone(),
        total_return_pct: round_opt("totalReturnPct", summary.total_return_pct)?,
        sharpe_ratio: round_opt("sharpeRatio", summary.sharpe_ratio)?,
        max_drawdown_pct: round_opt("maxDrawdownPct", summary.max_drawdown_pct)?,
        total_trades: summary.total_trades,
        final_profit: round_opt("finalProfit", summary.final_profit)?,
        max_profit: round_opt("maxProfit", summary.max_profit)?,
        min_profit: round_opt("minProfit", summary.min_profit)?,
        trade_count: summary.trade_count,
        final_state,
    })
}
