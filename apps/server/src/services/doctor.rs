//! Doctor service
//!
//! A doctor's health services are authoritative; every change to them is
//! reflected in the clinics the doctor belongs to.

use super::{
    integrity::recompute_clinics,
    normalize_name,
    peers::{PeerClinicOps, PeerHealthServiceOps},
};
use crate::{
    db::{DoctorRepository, Document, Filter, Page, PageRequest, Patch, SetField},
    Error, Result,
};
use registry_models::{Doctor, EntityId, IdSet};
use std::sync::Arc;

pub struct DoctorService {
    doctors: Arc<DoctorRepository>,
    clinics: Arc<dyn PeerClinicOps>,
    health_services: Arc<dyn PeerHealthServiceOps>,
}

impl DoctorService {
    pub fn new(
        doctors: Arc<DoctorRepository>,
        clinics: Arc<dyn PeerClinicOps>,
        health_services: Arc<dyn PeerHealthServiceOps>,
    ) -> Self {
        Self {
            doctors,
            clinics,
            health_services,
        }
    }

    pub async fn create(&self, name: &str) -> Result<Doctor> {
        let doctor = self.doctors.insert(Document::new(normalize_name(name)?)).await?;
        tracing::info!(doctor_id = %doctor.id, "Doctor created");
        Ok(doctor)
    }

    pub async fn get(&self, id: EntityId) -> Result<Doctor> {
        self.doctors
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Doctor", id))
    }

    pub async fn list(&self, filter: &Filter, page: &PageRequest) -> Result<Page<Doctor>> {
        self.doctors.find(filter, page).await
    }

    pub async fn update(&self, id: EntityId, name: &str) -> Result<Doctor> {
        let patch = Patch::set_name(normalize_name(name)?);
        self.doctors
            .update_one(id, &patch)
            .await?
            .ok_or_else(|| Error::not_found("Doctor", id))
    }

    /// Remove the doctor from its clinics, rebuild their health services, then
    /// delete the doctor.
    pub async fn delete(&self, id: EntityId) -> Result<()> {
        let doctor = self.get(id).await?;
        let affected = self.linked_clinics(&doctor).await?;

        let modified = self
            .clinics
            .update_by_filter(
                &Filter::contains(SetField::Doctors, id),
                &Patch::pull(SetField::Doctors, IdSet::single(id)),
            )
            .await?;

        let recomputed =
            recompute_clinics(self.clinics.as_ref(), self.doctors.as_ref(), &affected).await?;

        if !self.doctors.delete_by_id(id).await? {
            return Err(Error::not_found("Doctor", id));
        }

        tracing::info!(doctor_id = %id, modified, recomputed, "Doctor deleted");
        Ok(())
    }

    /// Attach a health service to a doctor and to every clinic the doctor is in.
    pub async fn add_health_service(
        &self,
        health_service_id: EntityId,
        doctor_id: EntityId,
    ) -> Result<Doctor> {
        self.resolve_pair(health_service_id, doctor_id).await?;

        let modified = self
            .clinics
            .update_by_filter(
                &Filter::contains(SetField::Doctors, doctor_id),
                &Patch::add_to_set(SetField::HealthServices, IdSet::single(health_service_id)),
            )
            .await?;

        let doctor = self
            .doctors
            .update_one(
                doctor_id,
                &Patch::add_to_set(SetField::HealthServices, IdSet::single(health_service_id)),
            )
            .await?
            .ok_or_else(|| Error::not_found("Doctor", doctor_id))?;

        tracing::info!(
            doctor_id = %doctor_id,
            health_service_id = %health_service_id,
            modified,
            "Health service added to doctor"
        );
        Ok(doctor)
    }

    /// Detach a health service from a doctor and rebuild the doctor's clinics.
    pub async fn remove_health_service(
        &self,
        health_service_id: EntityId,
        doctor_id: EntityId,
    ) -> Result<Doctor> {
        self.resolve_pair(health_service_id, doctor_id).await?;

        let doctor = self
            .doctors
            .update_one(
                doctor_id,
                &Patch::pull(SetField::HealthServices, IdSet::single(health_service_id)),
            )
            .await?
            .ok_or_else(|| Error::not_found("Doctor", doctor_id))?;

        let affected = self.linked_clinics(&doctor).await?;
        let recomputed =
            recompute_clinics(self.clinics.as_ref(), self.doctors.as_ref(), &affected).await?;

        tracing::info!(
            doctor_id = %doctor_id,
            health_service_id = %health_service_id,
            recomputed,
            "Health service removed from doctor"
        );
        Ok(doctor)
    }

    /// Apply a raw patch to every matching doctor.
    pub async fn update_by_filter(&self, filter: &Filter, patch: &Patch) -> Result<u64> {
        self.doctors.update_many(filter, patch).await
    }

    /// Clinics linked to the doctor from either side of the membership.
    async fn linked_clinics(&self, doctor: &Doctor) -> Result<IdSet> {
        let listing = self
            .clinics
            .find_ids(&Filter::contains(SetField::Doctors, doctor.id))
            .await?;
        Ok(doctor.clinics.union(&listing))
    }

    async fn resolve_pair(&self, health_service_id: EntityId, doctor_id: EntityId) -> Result<()> {
        self.health_services
            .get_by_id(health_service_id)
            .await?
            .ok_or_else(|| Error::not_found("HealthService", health_service_id))?;
        self.get(doctor_id).await?;
        Ok(())
    }
}
