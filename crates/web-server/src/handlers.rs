use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use core_types::{
    ArtifactDescriptor, Horizon, NormalizedReport, Story, StoryIndexEntry, VisualizationEntry,
    VisualizationFilter, VizPayloadType,
};
use query::{QueryError, ReportQueryService, ReportView, SymbolSlice, VizPayload};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct HorizonQuery {
    pub horizon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StaticQuery {
    pub format: Option<String>,
}

/// Runs a query on the blocking pool; every query touches the filesystem.
async fn run_query<T, F>(state: &AppState, query: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&ReportQueryService) -> Result<T, QueryError> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    Ok(tokio::task::spawn_blocking(move || query(&service)).await??)
}

fn parse_horizon(raw: &str) -> Result<Horizon, AppError> {
    raw.parse().map_err(|e| AppError::BadRequest(format!("{e}")))
}

/// # GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// # GET /api/viz/list?domain=&tool=&type=
pub async fn list_visualizations(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<VisualizationFilter>,
) -> Result<Json<Vec<VisualizationEntry>>, AppError> {
    let entries = run_query(&state, move |service| Ok(service.list_visualizations(&filter))).await?;
    Ok(Json(entries))
}

/// # GET /api/viz/stories
/// Index entries only; full bodies are fetched per slug.
pub async fn list_stories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<StoryIndexEntry>>, AppError> {
    let stories = run_query(&state, |service| Ok(service.list_stories())).await?;
    Ok(Json(stories))
}

/// # GET /api/viz/stories/:slug
pub async fn get_story(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Story>, AppError> {
    let story = run_query(&state, move |service| service.story(&slug)).await?;
    Ok(Json(story))
}

/// # GET /api/viz/:viz_id/:payload_type
/// `data` and `plotly` answer with JSON; `static` streams the image (`?format=png|svg|jpg`).
pub async fn get_visualization(
    Path((viz_id, payload_type)): Path<(String, String)>,
    Query(params): Query<StaticQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let payload_type: VizPayloadType = payload_type.parse().map_err(|e| AppError::BadRequest(format!("{e}")))?;
    let payload = run_query(&state, move |service| {
        service.visualization_payload(&viz_id, payload_type, params.format.as_deref())
    })
    .await?;

    Ok(match payload {
        VizPayload::Json(value) => Json(value).into_response(),
        VizPayload::Static(asset) => ([(header::CONTENT_TYPE, asset.content_type)], asset.bytes).into_response(),
    })
}

/// # GET /api/results/artifacts
pub async fn list_artifacts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ArtifactDescriptor>>, AppError> {
    let descriptors = run_query(&state, |service| Ok(service.list_artifacts())).await?;
    Ok(Json(descriptors))
}

/// # GET /api/results/latest?horizon=30min
/// The dashboard's entry point: latest backtest if any, else the horizon's simulation.
pub async fn latest_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HorizonQuery>,
) -> Result<Json<ReportView>, AppError> {
    let horizon = params.horizon.as_deref().map(parse_horizon).transpose()?;
    let view = run_query(&state, move |service| service.latest_simulation_or_backtest(horizon)).await?;
    Ok(Json(view))
}

/// # GET /api/results/simulation/:horizon
pub async fn simulation_report(
    Path(horizon): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReportView>, AppError> {
    let horizon = parse_horizon(&horizon)?;
    let view = run_query(&state, move |service| service.simulation_report(horizon)).await?;
    Ok(Json(view))
}

/// # GET /api/results/:report_id
pub async fn get_report(
    Path(report_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<NormalizedReport>, AppError> {
    let report = run_query(&state, move |service| service.report(&report_id)).await?;
    Ok(Json(report))
}

/// # GET /api/results/:report_id/symbols/:symbol
pub async fn get_symbol_slice(
    Path((report_id, symbol)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SymbolSlice>, AppError> {
    let slice = run_query(&state, move |service| service.symbol_slice(&report_id, &symbol)).await?;
    Ok(Json(slice))
}
