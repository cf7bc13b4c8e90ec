use crate::error::AnalyticsError;
use crate::rounding::{round_2dp, round_opt};
use core_types::{PricePoint, Timestamp, TradeEvent, TradeSide};
use serde::Serialize;

/// One price sample with the trades attached to it, ready for a combined price/trade chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedPoint {
    pub timestamp: Timestamp,
    pub price: f64,
    pub buy_trade: Option<f64>,
    pub sell_trade: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlignedSeries {
    pub points: Vec<AlignedPoint>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The display copy: prices and trade values at two decimals. Timestamps are untouched.
    pub fn rounded(&self) -> Result<AlignedSeries, AnalyticsError> {
        let points = self
            .points
            .iter()
            .map(|p| {
                Ok(AlignedPoint {
                    timestamp: p.timestamp,
                    price: round_2dp("price", p.price)?,
                    buy_trade: round_opt("buyTrade", p.buy_trade)?,
                    sell_trade: round_opt("sellTrade", p.sell_trade)?,
                })
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;
        Ok(AlignedSeries { points })
    }
}

/// Index of the price sample closest in time to `t`, the earliest one on ties.
///
/// Any order of `prices` is accepted; sorted input (every normalized series) takes a binary
/// search. Returns `None` only for an empty slice.
pub fn nearest_index(prices: &[PricePoint], t: Timestamp) -> Option<usize> {
    if is_time_ordered(prices) {
        nearest_in_sorted(prices, t)
    } else {
        nearest_by_scan(prices, t)
    }
}

fn is_time_ordered(prices: &[PricePoint]) -> bool {
    prices.is_sorted_by(|a, b| a.timestamp <= b.timestamp)
}

fn nearest_in_sorted(prices: &[PricePoint], t: Timestamp) -> Option<usize> {
    if prices.is_empty() {
        return None;
    }
    let upper = prices.partition_point(|p| p.timestamp < t);
    if upper == 0 {
        return Some(0);
    }
    // First sample of the run sharing the closest lower timestamp.
    let lower_ts = prices[upper - 1].timestamp;
    let lower = prices.partition_point(|p| p.timestamp < lower_ts);
    if upper == prices.len() {
        return Some(lower);
    }
    let below = t - lower_ts;
    let above = prices[upper].timestamp - t;
    Some(if above < below { upper } else { lower })
}

fn nearest_by_scan(prices: &[PricePoint], t: Timestamp) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in prices.iter().enumerate() {
        let distance = (t - p.timestamp).abs();
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// Attaches every trade's price to its nearest price sample, on the buy or sell slot.
///
/// Samples keep their input order. Trades are applied in order, so a later trade on the same
/// sample and side replaces an earlier one.
pub fn align(prices: &[PricePoint], trades: &[TradeEvent]) -> AlignedSeries {
    let mut points: Vec<AlignedPoint> = prices
        .iter()
        .map(|p| AlignedPoint { timestamp: p.timestamp, price: p.price, buy_trade: None, sell_trade: None })
        .collect();
    let nearest: fn(&[PricePoint], Timestamp) -> Option<usize> =
        if is_time_ordered(prices) { nearest_in_sorted } else { nearest_by_scan };

    let mut overwritten = 0usize;
    for trade in trades {
        let Some(idx) = nearest(prices, trade.timestamp) else {
            break;
        };
        let slot = match trade.side {
            TradeSide::Buy => &mut points[idx].buy_trade,
            TradeSide::Sell => &mut points[idx].sell_trade,
        };
        if slot.replace(trade.price).is_some() {
            overwritten += 1;
        }
    }
    if overwritten > 0 {
        tracing::trace!(overwritten, "Trades replaced earlier trades on the same price sample.");
    }

    AlignedSeries { points }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(samples: &[(f64, f64)]) -> Vec<PricePoint> {
        samples.iter().map(|&(timestamp, price)| PricePoint { timestamp, price }).collect()
    }

    fn trade(timestamp: f64, price: f64, side: TradeSide) -> TradeEvent {
        TradeEvent { timestamp, price, quantity: 1.0, side, agent_id: None }
    }

    fn brute_force_nearest(prices: &[PricePoint], t: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in prices.iter().enumerate() {
            let d = (t - p.timestamp).abs();
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    #[test]
    fn buy_trade_lands_on_the_nearest_sample() {
        let series = align(&prices(&[(0.0, 10.004), (60.0, 10.996)]), &[trade(5.0, 10.01, TradeSide::Buy)]);

        assert_eq!(series.points[0].buy_trade, Some(10.01));
        assert_eq!(series.points[0].sell_trade, None);
        assert_eq!(series.points[1].buy_trade, None);

        let shown = series.rounded().unwrap();
        assert_eq!(shown.points[0].price, 10.0);
        assert_eq!(shown.points[1].price, 11.0);
        assert_eq!(shown.points[0].buy_trade, Some(10.01));
    }

    #[test]
    fn later_trades_overwrite_the_same_slot() {
        let series = align(
            &prices(&[(0.0, 1.0), (10.0, 2.0)]),
            &[
                trade(1.0, 1.1, TradeSide::Sell),
                trade(2.0, 1.2, TradeSide::Sell),
                trade(3.0, 1.3, TradeSide::Buy),
            ],
        );
        assert_eq!(series.points[0].sell_trade, Some(1.2));
        assert_eq!(series.points[0].buy_trade, Some(1.3));
        assert_eq!(series.points[1], AlignedPoint { timestamp: 10.0, price: 2.0, buy_trade: None, sell_trade: None });
    }

    #[test]
    fn ties_go_to_the_earliest_sample() {
        let ps = prices(&[(0.0, 1.0), (2.0, 1.0), (2.0, 1.5), (4.0, 1.0)]);
        assert_eq!(nearest_index(&ps, 1.0), Some(0));
        assert_eq!(nearest_index(&ps, 3.0), Some(1));
        assert_eq!(nearest_index(&ps, 2.0), Some(1));
        assert_eq!(nearest_index(&ps, 2.4), Some(1));
        assert_eq!(nearest_index(&ps, -5.0), Some(0));
        assert_eq!(nearest_index(&ps, 9.0), Some(3));
    }

    #[test]
    fn empty_prices_align_to_nothing() {
        let series = align(&[], &[trade(1.0, 1.0, TradeSide::Buy)]);
        assert!(series.is_empty());
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn nearest_index_agrees_with_brute_force() {
        let sorted = prices(&[
            (0.0, 1.0), (0.5, 1.0), (0.5, 1.0), (3.25, 1.0), (7.0, 1.0), (7.0, 1.0), (7.5, 1.0), (12.0, 1.0),
        ]);
        let shuffled = prices(&[
            (7.0, 1.0), (0.5, 1.0), (12.0, 1.0), (0.0, 1.0), (7.5, 1.0), (3.25, 1.0), (0.5, 1.0), (7.0, 1.0),
        ]);
        for ps in [&sorted, &shuffled] {
            let mut t = -2.0;
            while t <= 14.0 {
                assert_eq!(nearest_index(ps, t), brute_force_nearest(ps, t), "t = {t}");
                t += 0.125;
            }
        }
    }

    #[test]
    fn unsorted_prices_still_attach_to_the_nearest_sample() {
        let series = align(&prices(&[(10.0, 9.0), (0.0, 8.0), (20.0, 7.0)]), &[trade(1.0, 9.5, TradeSide::Buy)]);
        let buys: Vec<_> = series.points.iter().map(|p| p.buy_trade).collect();
        assert_eq!(buys, vec![None, Some(9.5), None]);
        assert_eq!(series.points[0].timestamp, 10.0);
    }

    #[test]
    fn every_trade_is_attached_exactly_once() {
        let ps = prices(&[(0.0, 1.0), (5.0, 2.0), (9.0, 3.0)]);
        let trades: Vec<TradeEvent> = (0..10)
            .map(|i| trade(f64::from(i), 100.0 + f64::from(i), if i % 2 == 0 { TradeSide::Buy } else { TradeSide::Sell }))
            .collect();
        let series = align(&ps, &trades);

        for t in &trades {
            let idx = brute_force_nearest(&ps, t.timestamp).unwrap();
            let attached = series
                .points
                .iter()
                .enumerate()
                .filter(|(i, p)| {
                    let slot = if t.side == TradeSide::Buy { p.buy_trade } else { p.sell_trade };
                    *i == idx && slot.is_some()
                })
                .count();
            assert_eq!(attached, 1);
        }
    }
}
