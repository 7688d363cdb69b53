use crate::Result;
use registry_models::EntityId;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Body of create and update requests for every entity type.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NameRequest {
    #[validate(
        length(min = 1, max = 256, message = "must be between 1 and 256 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
}

/// Body of `POST/DELETE /clinics/doctor/:clinicId`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DoctorLinkRequest {
    #[validate(custom(function = "entity_id"))]
    pub doctor_id: String,
}

impl DoctorLinkRequest {
    pub fn doctor_id(&self) -> Result<EntityId> {
        Ok(EntityId::parse(&self.doctor_id)?)
    }
}

/// Body of `POST/DELETE /doctors/healthService/:doctorId`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HealthServiceLinkRequest {
    #[validate(custom(function = "entity_id"))]
    pub health_service_id: String,
}

impl HealthServiceLinkRequest {
    pub fn health_service_id(&self) -> Result<EntityId> {
        Ok(EntityId::parse(&self.health_service_id)?)
    }
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("is not allowed to be empty".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn entity_id(value: &str) -> std::result::Result<(), ValidationError> {
    if EntityId::parse(value).is_err() {
        let mut err = ValidationError::new("entity_id");
        err.message = Some("must be a valid id".into());
        return Err(err);
    }
    Ok(())
}
