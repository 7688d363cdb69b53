use crate::api::handlers::health_services;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn health_service_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/healthServices",
            post(health_services::create_health_service)
                .get(health_services::list_health_services),
        )
        .route(
            "/healthServices/:healthServiceId",
            get(health_services::get_health_service)
                .patch(health_services::update_health_service)
                .delete(health_services::delete_health_service),
        )
}
