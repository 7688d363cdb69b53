//! Narrow capabilities entity services expose to each other.
//!
//! A service never holds a peer *service*; it holds only the operations a
//! cascade needs on the peer's collection. The repositories implement these,
//! and tests substitute fakes.

use crate::{
    db::{ClinicRepository, DoctorRepository, Filter, HealthServiceRepository, Patch, Repository},
    Result,
};
use async_trait::async_trait;
use registry_models::{Clinic, Doctor, EntityId, HealthService, IdSet};

#[async_trait]
pub trait PeerClinicOps: Send + Sync {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<Clinic>>;

    /// Ids of every clinic matching `filter`.
    async fn find_ids(&self, filter: &Filter) -> Result<IdSet>;

    async fn update_by_id(&self, id: EntityId, patch: &Patch) -> Result<Option<Clinic>>;

    /// Returns the number of clinics the patch changed.
    async fn update_by_filter(&self, filter: &Filter, patch: &Patch) -> Result<u64>;
}

#[async_trait]
pub trait PeerDoctorOps: Send + Sync {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<Doctor>>;

    /// Unknown ids are skipped.
    async fn get_by_ids(&self, ids: &IdSet) -> Result<Vec<Doctor>>;

    async fn update_by_id(&self, id: EntityId, patch: &Patch) -> Result<Option<Doctor>>;

    async fn update_by_filter(&self, filter: &Filter, patch: &Patch) -> Result<u64>;
}

#[async_trait]
pub trait PeerHealthServiceOps: Send + Sync {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<HealthService>>;
}

#[async_trait]
impl PeerClinicOps for ClinicRepository {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<Clinic>> {
        self.find_by_id(id).await
    }

    async fn find_ids(&self, filter: &Filter) -> Result<IdSet> {
        Repository::find_ids(self, filter).await
    }

    async fn update_by_id(&self, id: EntityId, patch: &Patch) -> Result<Option<Clinic>> {
        self.update_one(id, patch).await
    }

    async fn update_by_filter(&self, filter: &Filter, patch: &Patch) -> Result<u64> {
        self.update_many(filter, patch).await
    }
}

#[async_trait]
impl PeerDoctorOps for DoctorRepository {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<Doctor>> {
        self.find_by_id(id).await
    }

    async fn get_by_ids(&self, ids: &IdSet) -> Result<Vec<Doctor>> {
        self.find_by_ids(ids).await
    }

    async fn update_by_id(&self, id: EntityId, patch: &Patch) -> Result<Option<Doctor>> {
        self.update_one(id, patch).await
    }

    async fn update_by_filter(&self, filter: &Filter, patch: &Patch) -> Result<u64> {
        self.update_many(filter, patch).await
    }
}

#[async_trait]
impl PeerHealthServiceOps for HealthServiceRepository {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<HealthService>> {
        self.find_by_id(id).await
    }
}
