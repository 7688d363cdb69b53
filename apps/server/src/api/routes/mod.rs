mod clinics;
mod doctors;
mod health_services;

pub use clinics::clinic_routes;
pub use doctors::doctor_routes;
pub use health_services::health_service_routes;
