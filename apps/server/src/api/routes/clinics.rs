use crate::api::handlers::clinics;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn clinic_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/clinics",
            post(clinics::create_clinic).get(clinics::list_clinics),
        )
        .route(
            "/clinics/:clinicId",
            get(clinics::get_clinic)
                .patch(clinics::update_clinic)
                .delete(clinics::delete_clinic),
        )
        // Doctor membership
        .route(
            "/clinics/doctor/:clinicId",
            post(clinics::add_doctor).delete(clinics::remove_doctor),
        )
        .route(
            "/clinics/:clinicId/healthServices/recompute",
            post(clinics::recompute_health_services),
        )
}
