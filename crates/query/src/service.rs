use crate::error::QueryError;
use crate::view::{ReportView, SymbolSlice};
use artifacts::catalog::{self, StaticAsset};
use artifacts::{ArtifactError, ArtifactLocator, ArtifactStore, FsProbe, LocatorContext, RealFs};
use configuration::{BacktestSettings, PathSettings, Settings};
use core_types::artifact::display_relative;
use core_types::{
    ArtifactDescriptor, ArtifactName, Horizon, NormalizedReport, Story, StoryIndexEntry,
    VisualizationEntry, VisualizationFilter, VizPayloadType,
};
use normalizer::{SchemaAdapter, SourceHint};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_STATIC_FORMAT: &str = "png";

/// A visualization payload: JSON for `data`/`plotly`, image bytes for `static`.
#[derive(Debug, Clone, PartialEq)]
pub enum VizPayload {
    Json(Value),
    Static(StaticAsset),
}

/// The read side of the pipeline, shared by the HTTP handlers and the CLI.
///
/// Every call locates its artifact afresh; nothing but the optional decode cache outlives a
/// request. The service is `Send + Sync` and meant to sit behind an `Arc`.
pub struct ReportQueryService<P: FsProbe = RealFs> {
    locator: ArtifactLocator<P>,
    context: LocatorContext,
    store: ArtifactStore,
    adapter: SchemaAdapter,
    paths: PathSettings,
    backtest: BacktestSettings,
    default_horizon: Horizon,
}

impl ReportQueryService<RealFs> {
    pub fn new(settings: &Settings, current_dir: impl Into<PathBuf>) -> Self {
        let locator = ArtifactLocator::new(settings.paths.results_dir.clone());
        Self::with_locator(settings, locator, current_dir)
    }
}

impl<P: FsProbe> ReportQueryService<P> {
    pub fn with_locator(settings: &Settings, locator: ArtifactLocator<P>, current_dir: impl Into<PathBuf>) -> Self {
        let mut context = LocatorContext::new(current_dir).with_root_markers(settings.paths.root_markers.clone());
        if let Some(root) = &settings.paths.project_root {
            context = context.with_project_root(root.clone());
        }
        Self {
            locator,
            context,
            store: ArtifactStore::new(settings.presentation.artifact_cache),
            adapter: SchemaAdapter::from_settings(&settings.presentation),
            paths: settings.paths.clone(),
            backtest: settings.backtest.clone(),
            default_horizon: settings.presentation.default_horizon,
        }
    }

    pub fn context(&self) -> &LocatorContext {
        &self.context
    }

    pub fn default_horizon(&self) -> Horizon {
        self.default_horizon
    }

    /// The backtest the dashboard prefers: the configured range, or simply the latest.
    pub fn preferred_backtest(&self) -> ArtifactName {
        match self.backtest.range() {
            Some((start, end)) => ArtifactName::Backtest { start, end },
            None => ArtifactName::LatestBacktest,
        }
    }

    pub fn locate(&self, name: &ArtifactName) -> ArtifactDescriptor {
        self.locator.locate(name, &self.context)
    }

    /// Descriptors for every artifact family the service knows about.
    pub fn list_artifacts(&self) -> Vec<ArtifactDescriptor> {
        let mut names: Vec<ArtifactName> = Horizon::ALL.iter().map(|h| ArtifactName::Simulation(*h)).collect();
        names.push(self.preferred_backtest());
        if names.last() != Some(&ArtifactName::LatestBacktest) {
            names.push(ArtifactName::LatestBacktest);
        }
        names.iter().map(|name| self.locate(name)).collect()
    }

    /// Locates, decodes and normalizes one artifact.
    pub fn load(&self, name: &ArtifactName) -> Result<NormalizedReport, QueryError> {
        let descriptor = self.locate(name);
        let Some(path) = descriptor.found_path() else {
            return Err(QueryError::NotFound {
                what: format!("Artifact '{name}'"),
                searched: descriptor.searched_display(&self.context.current_dir),
            });
        };

        let raw: Arc<Value> = self.store.load(path).map_err(|e| self.artifact_error(e))?;
        self.adapter.normalize(&raw, &SourceHint::from(name)).map_err(|e| {
            tracing::warn!(artifact = %name, path = %path.display(), error = %e, "Artifact failed schema classification.");
            QueryError::from(e)
        })
    }

    /// The dashboard's default view: the preferred backtest when one exists, otherwise the
    /// simulation for `horizon`. A missing artifact moves on to the next candidate; an
    /// artifact that exists but cannot be read is reported.
    pub fn latest_simulation_or_backtest(&self, horizon: Option<Horizon>) -> Result<ReportView, QueryError> {
        let horizon = horizon.unwrap_or(self.default_horizon);
        let order = [self.preferred_backtest(), ArtifactName::Simulation(horizon)];

        let mut searched = Vec::new();
        for name in &order {
            match self.load(name) {
                Ok(report) => return self.view(&report),
                Err(QueryError::NotFound { searched: s, .. }) => searched.extend(s),
                Err(e) => return Err(e),
            }
        }
        Err(QueryError::NotFound {
            what: format!("Neither a backtest nor a {horizon} simulation report"),
            searched,
        })
    }

    pub fn simulation_report(&self, horizon: Horizon) -> Result<ReportView, QueryError> {
        let report = self.load(&ArtifactName::Simulation(horizon))?;
        self.view(&report)
    }

    /// The normalized report behind any artifact key (`live`, `30min`, `backtest`, ...).
    pub fn report(&self, report_id: &str) -> Result<NormalizedReport, QueryError> {
        let name: ArtifactName = report_id
            .parse()
            .map_err(|_| QueryError::not_found(format!("Report '{report_id}'")))?;
        self.load(&name)
    }

    pub fn symbol_slice(&self, report_id: &str, symbol: &str) -> Result<SymbolSlice, QueryError> {
        let report = self.report(report_id)?;
        let series = report
            .symbol_series(symbol)
            .ok_or_else(|| QueryError::not_found(format!("Symbol '{symbol}' in report '{report_id}'")))?;
        SymbolSlice::build(&report.artifact, symbol, series).map_err(|e| QueryError::MalformedArtifact {
            artifact: report.artifact.clone(),
            reason: e.to_string(),
        })
    }

    fn view(&self, report: &NormalizedReport) -> Result<ReportView, QueryError> {
        ReportView::build(report).map_err(|e| QueryError::MalformedArtifact {
            artifact: report.artifact.clone(),
            reason: e.to_string(),
        })
    }

    // --- Catalog ---

    /// Story index entries; an absent stories directory reads as no stories.
    pub fn list_stories(&self) -> Vec<StoryIndexEntry> {
        self.catalog_dir(&self.paths.stories_dir)
            .map(|dir| catalog::list_stories(&dir))
            .unwrap_or_default()
    }

    pub fn story(&self, slug: &str) -> Result<Story, QueryError> {
        let dir = self.require_dir(&self.paths.stories_dir)?;
        catalog::load_story(&dir, slug).map_err(|e| self.artifact_error(e))
    }

    pub fn list_visualizations(&self, filter: &VisualizationFilter) -> Vec<VisualizationEntry> {
        let data_dir = self.catalog_dir(&self.paths.viz_data_dir);
        let stories_dir = self.catalog_dir(&self.paths.stories_dir);
        catalog::list_visualizations(data_dir.as_deref(), stories_dir.as_deref(), filter)
    }

    /// One visualization's payload by declared type. `format` only applies to `static`.
    pub fn visualization_payload(
        &self,
        viz_id: &str,
        payload_type: VizPayloadType,
        format: Option<&str>,
    ) -> Result<VizPayload, QueryError> {
        let payload = match payload_type {
            VizPayloadType::Data => {
                let dir = self.require_dir(&self.paths.viz_data_dir)?;
                VizPayload::Json(catalog::load_viz_data(&dir, viz_id).map_err(|e| self.artifact_error(e))?)
            }
            VizPayloadType::Plotly => {
                let dir = self.require_dir(&self.paths.viz_data_dir)?;
                VizPayload::Json(catalog::load_viz_plotly(&dir, viz_id).map_err(|e| self.artifact_error(e))?)
            }
            VizPayloadType::Static => {
                VizPayload::Static(self.static_visualization(viz_id, format.unwrap_or(DEFAULT_STATIC_FORMAT))?)
            }
        };
        Ok(payload)
    }

    pub fn static_visualization(&self, viz_id: &str, format: &str) -> Result<StaticAsset, QueryError> {
        let dir = self.require_dir(&self.paths.viz_static_dir)?;
        catalog::load_static(&dir, viz_id, format).map_err(|e| self.artifact_error(e))
    }

    fn catalog_dir(&self, relative: &Path) -> Option<PathBuf> {
        match self.locator.locate_dir(relative, &self.context) {
            Ok(dir) => Some(dir),
            Err(e) => {
                tracing::debug!(error = %e, "Catalog directory not found.");
                None
            }
        }
    }

    fn require_dir(&self, relative: &Path) -> Result<PathBuf, QueryError> {
        self.locator
            .locate_dir(relative, &self.context)
            .map_err(|e| self.artifact_error(e))
    }

    /// Renders paths relative to the working directory so errors never expose the absolute
    /// filesystem layout.
    fn artifact_error(&self, err: ArtifactError) -> QueryError {
        let base = &self.context.current_dir;
        match err {
            ArtifactError::NotFound(what) => QueryError::not_found(what),
            ArtifactError::DirectoryNotFound { relative, searched } => QueryError::NotFound {
                what: format!("Directory '{}'", relative.display()),
                searched: searched.iter().map(|p| display_relative(p, base)).collect(),
            },
            // Removed between the existence check and the read.
            ArtifactError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                QueryError::NotFound { what: "Artifact".to_string(), searched: vec![display_relative(&path, base)] }
            }
            ArtifactError::Io { path, source } => {
                let artifact = display_relative(&path, base);
                tracing::warn!(%artifact, error = %source, "Artifact could not be read.");
                QueryError::MalformedArtifact { artifact, reason: source.to_string() }
            }
            ArtifactError::Malformed { path, source } => {
                let artifact = display_relative(&path, base);
                tracing::warn!(%artifact, error = %source, "Artifact is not valid JSON.");
                QueryError::MalformedArtifact { artifact, reason: source.to_string() }
            }
        }
    }
}
