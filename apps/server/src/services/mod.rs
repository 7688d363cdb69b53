//! Business logic layer
//!
//! One service per entity type. Relationship operations cascade into peer
//! collections through the narrow capabilities in [`peers`], and anything that
//! can shrink a clinic's derived health services goes through [`integrity`].

pub mod clinic;
pub mod doctor;
pub mod health_service;
pub(crate) mod integrity;
pub mod peers;

pub use clinic::ClinicService;
pub use doctor::DoctorService;
pub use health_service::HealthServiceService;
pub use peers::{PeerClinicOps, PeerDoctorOps, PeerHealthServiceOps};

use crate::{
    db::{ClinicRepository, DocumentStore, DoctorRepository, HealthServiceRepository},
    Error, Result,
};
use std::sync::Arc;

/// The three entity services, wired to each other over one store.
#[derive(Clone)]
pub struct Services {
    pub clinics: Arc<ClinicService>,
    pub doctors: Arc<DoctorService>,
    pub health_services: Arc<HealthServiceService>,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let clinic_repo = Arc::new(ClinicRepository::new(store.clone()));
        let doctor_repo = Arc::new(DoctorRepository::new(store.clone()));
        let health_service_repo = Arc::new(HealthServiceRepository::new(store));

        let clinics = Arc::new(ClinicService::new(
            clinic_repo.clone(),
            doctor_repo.clone(),
        ));
        let doctors = Arc::new(DoctorService::new(
            doctor_repo.clone(),
            clinic_repo.clone(),
            health_service_repo.clone(),
        ));
        let health_services = Arc::new(HealthServiceService::new(
            health_service_repo,
            clinic_repo,
            doctor_repo,
        ));

        Self {
            clinics,
            doctors,
            health_services,
        }
    }
}

/// Trim a name and reject it if nothing is left.
pub(crate) fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(
            "\"name\" is not allowed to be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
