use crate::api::handlers::doctors;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn doctor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/doctors",
            post(doctors::create_doctor).get(doctors::list_doctors),
        )
        .route(
            "/doctors/:doctorId",
            get(doctors::get_doctor)
                .patch(doctors::update_doctor)
                .delete(doctors::delete_doctor),
        )
        // Health services provided by the doctor
        .route(
            "/doctors/healthService/:doctorId",
            post(doctors::add_health_service).delete(doctors::remove_health_service),
        )
}
