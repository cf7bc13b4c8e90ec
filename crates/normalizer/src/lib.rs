//! # Vizfolio Schema Adapter
//!
//! Turns whatever the simulation and backtest engines wrote to disk into the canonical
//! `NormalizedReport` from `core-types`.
//!
//! ## Architectural Principles
//!
//! - **Pure projection:** `SchemaAdapter::normalize` reads a decoded JSON document and a hint
//!   from the locator, and nothing else. Equal inputs always give equal reports.
//! - **Total over known shapes:** once a payload is classified, missing or oddly encoded
//!   fields never fail the projection. Counters become zero, ratios stay absent, and records
//!   without a timestamp are skipped. Only an unrecognizable payload is an error.
//!
//! ## Public API
//!
//! - `SchemaAdapter`: classification plus projection.
//! - `SourceHint`: the artifact key and family the locator expected.
//! - `TradingParticipantFilter`: the agent-id convention applied to backtest summaries.
//! - `SchemaError`: the one way normalization can fail.

pub mod error;
pub mod participants;

mod backtest;
mod classify;
mod fields;
mod simulation;

pub use error::SchemaError;
pub use participants::TradingParticipantFilter;

use classify::{classify, PayloadShape};
use configuration::PresentationSettings;
use core_types::{ArtifactName, NormalizedReport, SourceFamily};
use serde_json::Value;

/// What the locator knew about a payload before it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHint {
    pub artifact: String,
    pub expected: SourceFamily,
}

impl SourceHint {
    pub fn new(artifact: impl Into<String>, expected: SourceFamily) -> Self {
        Self { artifact: artifact.into(), expected }
    }
}

impl From<&ArtifactName> for SourceHint {
    fn from(name: &ArtifactName) -> Self {
        Self::new(name.key(), name.expected_family())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaAdapter {
    participants: TradingParticipantFilter,
}

impl SchemaAdapter {
    pub fn new(participants: TradingParticipantFilter) -> Self {
        Self { participants }
    }

    pub fn from_settings(settings: &PresentationSettings) -> Self {
        Self::new(TradingParticipantFilter::from_settings(settings))
    }

    pub fn normalize(&self, raw: &Value, hint: &SourceHint) -> Result<NormalizedReport, SchemaError> {
        let mismatch = |reason: String| SchemaError::Mismatch { artifact: hint.artifact.clone(), reason };

        let report = match classify(raw).map_err(mismatch)? {
            PayloadShape::Backtest => backtest::project(raw, hint, &self.participants).map_err(mismatch)?,
            PayloadShape::Simulation { time_series } => simulation::project(raw, time_series, hint),
        };

        tracing::debug!(
            artifact = %hint.artifact,
            kind = ?report.kind(),
            id = %report.id,
            "Normalized report."
        );
        Ok(report)
    }
}
