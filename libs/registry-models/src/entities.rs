//! Clinic, doctor and health-service entities

use crate::id::{EntityId, IdSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clinic and the doctors working in it.
///
/// `health_services` is derived: it must equal the union of the
/// `health_services` of every doctor in `doctors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub doctors: IdSet,
    #[serde(default)]
    pub health_services: IdSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A doctor, the clinics they belong to and the services they provide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub clinics: IdSet,
    #[serde(default)]
    pub health_services: IdSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthService {
    pub id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Deduplicated union of the health services provided by `doctors`.
///
/// This is the whole derivation rule for `Clinic::health_services`; the result
/// depends only on the doctors passed in, so applying it repeatedly to the same
/// doctors always yields the same set.
pub fn derive_health_services<'a, I>(doctors: I) -> IdSet
where
    I: IntoIterator<Item = &'a Doctor>,
{
    let mut services = IdSet::new();
    for doctor in doctors {
        services.add_all(&doctor.health_services);
    }
    services
}
