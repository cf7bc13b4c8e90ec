//! # Vizfolio Analytics
//!
//! Turns normalized series into chart-ready views: trades attached to the price samples they
//! happened nearest to, and agent profit telemetry pivoted and summarized.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no knowledge of where the series came from. It depends only on
//!   `core-types`.
//! - **Full precision inside, rounded at the edge:** alignment and aggregation never round.
//!   The `rounded()` helpers and `rounding` module produce display copies at two decimals.
//!
//! ## Public API
//!
//! - `align` / `nearest_index`: the time aligner.
//! - `aggregate_profits`: per-agent pivots, summaries and ranking.
//! - `AnalyticsError`: a value could not be rounded for display.

pub mod aggregation;
pub mod alignment;
pub mod error;
pub mod rounding;

pub use aggregation::{aggregate_profits, PivotRow, PivotedSeries, ProfitAggregation};
pub use alignment::{align, nearest_index, AlignedPoint, AlignedSeries};
pub use error::AnalyticsError;
pub use rounding::{round_2dp, round_summary};
