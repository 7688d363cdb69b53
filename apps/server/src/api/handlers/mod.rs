pub mod clinics;
pub mod doctors;
pub mod health_services;
pub mod system;
