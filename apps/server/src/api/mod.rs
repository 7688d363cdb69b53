//! HTTP API: router assembly and middleware stack

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::{auth, config::ServerConfig, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router.
///
/// Entity routes live under `/v1` behind authentication; `/health` is public.
pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .merge(routes::clinic_routes())
        .merge(routes::doctor_routes())
        .merge(routes::health_service_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::authorize,
        ));

    let server = &state.config.server;
    let body_limit = server.max_request_body_size;
    let cors = cors_layer(server);

    Router::new()
        .route("/health", get(handlers::system::health))
        .nest("/v1", v1)
        .fallback(handlers::system::not_found)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
