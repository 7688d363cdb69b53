//! Clinic service
//!
//! Owns the clinic collection and the clinic side of the clinic/doctor link.

use super::{
    integrity::recompute_clinic_health_services,
    normalize_name,
    peers::PeerDoctorOps,
};
use crate::{
    db::{ClinicRepository, Document, Filter, Page, PageRequest, Patch, SetField, SetOp},
    Error, Result,
};
use registry_models::{Clinic, Doctor, EntityId, IdSet};
use std::sync::Arc;

pub struct ClinicService {
    clinics: Arc<ClinicRepository>,
    doctors: Arc<dyn PeerDoctorOps>,
}

impl ClinicService {
    pub fn new(clinics: Arc<ClinicRepository>, doctors: Arc<dyn PeerDoctorOps>) -> Self {
        Self { clinics, doctors }
    }

    pub async fn create(&self, name: &str) -> Result<Clinic> {
        let clinic = self.clinics.insert(Document::new(normalize_name(name)?)).await?;
        tracing::info!(clinic_id = %clinic.id, "Clinic created");
        Ok(clinic)
    }

    pub async fn get(&self, id: EntityId) -> Result<Clinic> {
        self.clinics
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Clinic", id))
    }

    pub async fn list(&self, filter: &Filter, page: &PageRequest) -> Result<Page<Clinic>> {
        self.clinics.find(filter, page).await
    }

    /// Rename a clinic. Relationship sets are not editable here.
    pub async fn update(&self, id: EntityId, name: &str) -> Result<Clinic> {
        let patch = Patch::set_name(normalize_name(name)?);
        self.clinics
            .update_one(id, &patch)
            .await?
            .ok_or_else(|| Error::not_found("Clinic", id))
    }

    /// Detach the clinic from every doctor, then delete it.
    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.get(id).await?;

        let modified = self
            .doctors
            .update_by_filter(
                &Filter::contains(SetField::Clinics, id),
                &Patch::pull(SetField::Clinics, IdSet::single(id)),
            )
            .await?;

        if !self.clinics.delete_by_id(id).await? {
            return Err(Error::not_found("Clinic", id));
        }

        tracing::info!(clinic_id = %id, modified, "Clinic deleted");
        Ok(())
    }

    /// Link a doctor to a clinic and propagate the doctor's health services.
    ///
    /// Propagation is add-only: services the clinic already derives from other
    /// doctors are kept.
    pub async fn add_doctor(&self, doctor_id: EntityId, clinic_id: EntityId) -> Result<Clinic> {
        let (doctor, _) = self.resolve_pair(doctor_id, clinic_id).await?;

        self.doctors
            .update_by_id(
                doctor_id,
                &Patch::add_to_set(SetField::Clinics, IdSet::single(clinic_id)),
            )
            .await?
            .ok_or_else(|| Error::not_found("Doctor", doctor_id))?;

        let patch = Patch::add_to_set(SetField::Doctors, IdSet::single(doctor_id)).and(
            SetOp::AddToSet(SetField::HealthServices, doctor.health_services.clone()),
        );
        let clinic = self
            .clinics
            .update_one(clinic_id, &patch)
            .await?
            .ok_or_else(|| Error::not_found("Clinic", clinic_id))?;

        tracing::info!(
            clinic_id = %clinic_id,
            doctor_id = %doctor_id,
            health_services = doctor.health_services.len(),
            "Doctor added to clinic"
        );
        Ok(clinic)
    }

    /// Unlink a doctor from a clinic and rebuild the clinic's health services.
    pub async fn remove_doctor(&self, doctor_id: EntityId, clinic_id: EntityId) -> Result<Clinic> {
        self.resolve_pair(doctor_id, clinic_id).await?;

        self.doctors
            .update_by_id(
                doctor_id,
                &Patch::pull(SetField::Clinics, IdSet::single(clinic_id)),
            )
            .await?
            .ok_or_else(|| Error::not_found("Doctor", doctor_id))?;

        self.clinics
            .update_one(
                clinic_id,
                &Patch::pull(SetField::Doctors, IdSet::single(doctor_id)),
            )
            .await?
            .ok_or_else(|| Error::not_found("Clinic", clinic_id))?;

        let clinic = self.recompute_health_services(clinic_id).await?;

        tracing::info!(
            clinic_id = %clinic_id,
            doctor_id = %doctor_id,
            "Doctor removed from clinic"
        );
        Ok(clinic)
    }

    /// Set the clinic's health services to the union of its doctors' services.
    pub async fn recompute_health_services(&self, clinic_id: EntityId) -> Result<Clinic> {
        recompute_clinic_health_services(self.clinics.as_ref(), self.doctors.as_ref(), clinic_id)
            .await
    }

    /// Apply a raw patch to every matching clinic.
    pub async fn update_by_filter(&self, filter: &Filter, patch: &Patch) -> Result<u64> {
        self.clinics.update_many(filter, patch).await
    }

    async fn resolve_pair(
        &self,
        doctor_id: EntityId,
        clinic_id: EntityId,
    ) -> Result<(Doctor, Clinic)> {
        let doctor = self
            .doctors
            .get_by_id(doctor_id)
            .await?
            .ok_or_else(|| Error::not_found("Doctor", doctor_id))?;
        let clinic = self.get(clinic_id).await?;
        Ok((doctor, clinic))
    }
}
