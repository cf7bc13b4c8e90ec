use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use query::QueryError;
use serde_json::json;
use thiserror::Error;

const REGENERATE_HINT: &str =
    "Run the simulation or backtest that produces this artifact, then retry.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Pipeline failures keep their taxonomy in the body (`kind`) so the dashboard can tell a
/// missing artifact apart from a broken one.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Query(err) => {
                let kind = err.kind();
                let message = err.to_string();
                match err {
                    QueryError::NotFound { searched, .. } => {
                        tracing::debug!(error = %message, "Request target not found.");
                        let mut body = json!({ "kind": kind, "error": message, "searched": searched });
                        if !searched.is_empty() {
                            body["hint"] = json!(REGENERATE_HINT);
                        }
                        (StatusCode::NOT_FOUND, body)
                    }
                    QueryError::SchemaMismatch { reason, .. } | QueryError::MalformedArtifact { reason, .. } => {
                        tracing::warn!(error = %message, "Artifact could not be presented.");
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            json!({ "kind": kind, "error": message, "reason": reason, "hint": REGENERATE_HINT }),
                        )
                    }
                }
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "kind": "bad_request", "error": message }))
            }
            AppError::Task(join_err) => {
                tracing::error!(error = ?join_err, "Blocking task failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "kind": "internal", "error": "An internal server error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
