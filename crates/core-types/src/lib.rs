pub mod artifact;
pub mod catalog;
pub mod enums;
pub mod error;
pub mod report;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use artifact::{ArtifactDescriptor, ArtifactName, MatchKind, Resolution};
pub use catalog::{Story, StoryIndexEntry, StoryVisualization, VisualizationEntry, VisualizationFilter};
pub use enums::{Horizon, ReportKind, SourceFamily, TradeSide, VizPayloadType};
pub use error::CoreError;
pub use report::{AgentFinalState, AgentSummary, NormalizedReport, ReportPayload, SimulationDiagnostics};
pub use series::{
    AgentProfitSnapshot, ConsensusSignal, PricePoint, RegimeDetection, SpreadPoint, SymbolSeries,
    Timestamp, TradeEvent, sort_by_timestamp,
};
