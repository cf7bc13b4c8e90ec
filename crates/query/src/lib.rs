//! # Vizfolio Query Service
//!
//! The single entry point the HTTP layer and the CLI use to read results. It wires the
//! pipeline together: `artifacts` finds and decodes, `normalizer` projects, `analytics`
//! aligns and aggregates, and the views in this crate shape the output.
//!
//! ## Public API
//!
//! - `ReportQueryService`: every read operation, from the dashboard report to catalog files.
//! - `ReportView` / `SymbolSlice`: ready-to-render, display-rounded views.
//! - `QueryError`: not found, schema mismatch, or malformed artifact.

pub mod error;
pub mod service;
pub mod view;

pub use error::QueryError;
pub use service::{ReportQueryService, VizPayload, DEFAULT_STATIC_FORMAT};
pub use view::{ReportHeader, ReportView, SymbolSlice};
