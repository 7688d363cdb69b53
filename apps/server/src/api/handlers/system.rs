//! Health check and fallback handlers

use crate::{state::AppState, Error};
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.health_check().await {
        Ok(storage) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "storage": storage,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "version": env!("CARGO_PKG_VERSION"),
                })),
            )
                .into_response()
        }
    }
}

pub async fn not_found(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "No route matched");
    Error::NotFound {
        entity: "Route",
        id: uri.path().to_string(),
    }
    .into_response()
}
