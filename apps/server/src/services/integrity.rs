//! Cross-reference maintenance between clinics and doctors.
//!
//! A clinic's `healthServices` is never edited directly except by incremental
//! add-only propagation; anything that can shrink it goes through
//! [`recompute_clinic_health_services`], which rebuilds the set from the
//! clinic's current doctors. Recomputation reads current state only, so running
//! it again after concurrent writers finish always converges.

use super::peers::{PeerClinicOps, PeerDoctorOps};
use crate::{
    db::{Patch, SetField},
    Error, Result,
};
use futures::future::try_join_all;
use registry_models::{derive_health_services, Clinic, EntityId, IdSet};

/// Rebuild one clinic's health-service set from its member doctors.
pub(crate) async fn recompute_clinic_health_services(
    clinics: &dyn PeerClinicOps,
    doctors: &dyn PeerDoctorOps,
    clinic_id: EntityId,
) -> Result<Clinic> {
    let clinic = clinics
        .get_by_id(clinic_id)
        .await?
        .ok_or_else(|| Error::not_found("Clinic", clinic_id))?;

    let members = doctors.get_by_ids(&clinic.doctors).await?;
    let derived = derive_health_services(&members);

    if derived == clinic.health_services {
        tracing::debug!(clinic_id = %clinic_id, "Clinic health services already consistent");
        return Ok(clinic);
    }

    let updated = clinics
        .update_by_id(
            clinic_id,
            &Patch::replace(SetField::HealthServices, derived),
        )
        .await?
        .ok_or_else(|| Error::not_found("Clinic", clinic_id))?;

    tracing::debug!(
        clinic_id = %clinic_id,
        doctors = members.len(),
        health_services = updated.health_services.len(),
        "Recomputed clinic health services"
    );
    Ok(updated)
}

/// Recompute every clinic in `clinic_ids` concurrently.
///
/// Clinics that no longer exist are skipped with a warning; any other failure
/// aborts and is returned. Returns the number of clinics recomputed.
pub(crate) async fn recompute_clinics(
    clinics: &dyn PeerClinicOps,
    doctors: &dyn PeerDoctorOps,
    clinic_ids: &IdSet,
) -> Result<usize> {
    let tasks = clinic_ids.iter().map(|&clinic_id| async move {
        match recompute_clinic_health_services(clinics, doctors, clinic_id).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => {
                tracing::warn!(
                    clinic_id = %clinic_id,
                    "Skipping recomputation for missing clinic"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    });

    let outcomes = try_join_all(tasks).await?;
    Ok(outcomes.into_iter().filter(|done| *done).count())
}
