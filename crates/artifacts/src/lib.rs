//! # Vizfolio Artifacts
//!
//! The disk-facing adapter of the pipeline: finds result artifacts under an uncertain
//! working directory, decodes them, and serves the story/visualization catalog files.
//!
//! ## Public API
//!
//! - `ArtifactLocator`: deterministic, ordered candidate search with the backtest fallback.
//! - `FsProbe`: the injectable existence/listing predicate (`RealFs`, `MemoryFs`).
//! - `ArtifactStore`: JSON decoding with an optional modification-time keyed cache.
//! - `catalog`: story and visualization listings and payloads.

pub mod catalog;
pub mod error;
pub mod locator;
pub mod probe;
pub mod store;

pub use catalog::StaticAsset;
pub use error::ArtifactError;
pub use locator::{ArtifactLocator, LocatorContext};
pub use probe::{FsProbe, MemoryFs, RealFs};
pub use store::ArtifactStore;
