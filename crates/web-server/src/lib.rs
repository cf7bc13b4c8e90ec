use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use configuration::{ServerSettings, Settings};
use query::ReportQueryService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReportQueryService>,
}

impl AppState {
    pub fn new(service: ReportQueryService) -> Self {
        Self { service: Arc::new(service) }
    }
}

/// Builds the router with its middleware stack. Kept separate from `run_server` so tests
/// can drive it without binding a socket.
pub fn app(state: AppState, server: &ServerSettings) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        // --- Catalog ---
        .route("/api/viz/list", get(handlers::list_visualizations))
        .route("/api/viz/stories", get(handlers::list_stories))
        .route("/api/viz/stories/:slug", get(handlers::get_story))
        .route("/api/viz/:viz_id/:payload_type", get(handlers::get_visualization))
        // --- Results ---
        .route("/api/results/artifacts", get(handlers::list_artifacts))
        .route("/api/results/latest", get(handlers::latest_report))
        .route("/api/results/simulation/:horizon", get(handlers::simulation_report))
        .route("/api/results/:report_id", get(handlers::get_report))
        .route("/api/results/:report_id/symbols/:symbol", get(handlers::get_symbol_slice))
        .with_state(Arc::new(state))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring invalid CORS origin.");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

/// The main function to configure and run the web server.
///
/// Tracing is initialized by the caller; this only wires the service and serves it.
pub async fn run_server(settings: Settings, addr: SocketAddr) -> anyhow::Result<()> {
    let current_dir = std::env::current_dir()?;
    let service = ReportQueryService::new(&settings, current_dir);
    let app = app(AppState::new(service), &settings.server);

    tracing::info!(%addr, "Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
