//! Health service catalogue
//!
//! Names are unique; the store rejects duplicates.

use super::{
    normalize_name,
    peers::{PeerClinicOps, PeerDoctorOps},
};
use crate::{
    db::{Document, Filter, HealthServiceRepository, Page, PageRequest, Patch, SetField},
    Error, Result,
};
use registry_models::{EntityId, HealthService, IdSet};
use std::sync::Arc;

pub struct HealthServiceService {
    health_services: Arc<HealthServiceRepository>,
    clinics: Arc<dyn PeerClinicOps>,
    doctors: Arc<dyn PeerDoctorOps>,
}

impl HealthServiceService {
    pub fn new(
        health_services: Arc<HealthServiceRepository>,
        clinics: Arc<dyn PeerClinicOps>,
        doctors: Arc<dyn PeerDoctorOps>,
    ) -> Self {
        Self {
            health_services,
            clinics,
            doctors,
        }
    }

    pub async fn create(&self, name: &str) -> Result<HealthService> {
        let health_service = self
            .health_services
            .insert(Document::new(normalize_name(name)?))
            .await?;
        tracing::info!(health_service_id = %health_service.id, "Health service created");
        Ok(health_service)
    }

    pub async fn get(&self, id: EntityId) -> Result<HealthService> {
        self.health_services
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("HealthService", id))
    }

    pub async fn list(
        &self,
        filter: &Filter,
        page: &PageRequest,
    ) -> Result<Page<HealthService>> {
        self.health_services.find(filter, page).await
    }

    pub async fn update(&self, id: EntityId, name: &str) -> Result<HealthService> {
        let patch = Patch::set_name(normalize_name(name)?);
        self.health_services
            .update_one(id, &patch)
            .await?
            .ok_or_else(|| Error::not_found("HealthService", id))
    }

    /// Purge the id from every clinic and doctor, then delete the record.
    ///
    /// No recomputation is needed: the id is gone from every doctor, so no
    /// derivation could bring it back.
    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.get(id).await?;

        let filter = Filter::contains(SetField::HealthServices, id);
        let patch = Patch::pull(SetField::HealthServices, IdSet::single(id));
        let clinics = self.clinics.update_by_filter(&filter, &patch).await?;
        let doctors = self.doctors.update_by_filter(&filter, &patch).await?;

        if !self.health_services.delete_by_id(id).await? {
            return Err(Error::not_found("HealthService", id));
        }

        tracing::info!(
            health_service_id = %id,
            clinics,
            doctors,
            "Health service deleted"
        );
        Ok(())
    }
}
