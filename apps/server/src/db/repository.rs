//! Typed repositories over the document store
//!
//! Each repository is bound to one collection and converts stored documents
//! into the entity type of that collection.

use super::{
    document::{Collection, Document, Filter, Page, PageRequest, Patch},
    traits::DocumentStore,
};
use crate::Result;
use registry_models::{Clinic, Doctor, EntityId, HealthService, IdSet};
use std::{marker::PhantomData, sync::Arc};

/// An entity type persisted in its own collection.
pub trait StoredEntity: From<Document> + Send + Sync + 'static {
    const COLLECTION: Collection;
}

impl StoredEntity for Clinic {
    const COLLECTION: Collection = Collection::Clinics;
}

impl StoredEntity for Doctor {
    const COLLECTION: Collection = Collection::Doctors;
}

impl StoredEntity for HealthService {
    const COLLECTION: Collection = Collection::HealthServices;
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

pub type ClinicRepository = Repository<Clinic>;
pub type DoctorRepository = Repository<Doctor>;
pub type HealthServiceRepository = Repository<HealthService>;

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: StoredEntity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn entity_name(&self) -> &'static str {
        T::COLLECTION.entity_name()
    }

    pub async fn insert(&self, document: Document) -> Result<T> {
        self.store
            .insert(T::COLLECTION, document)
            .await
            .map(T::from)
    }

    pub async fn find_by_id(&self, id: EntityId) -> Result<Option<T>> {
        Ok(self
            .store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(T::from))
    }

    pub async fn find_by_ids(&self, ids: &IdSet) -> Result<Vec<T>> {
        let docs = self.store.find_by_ids(T::COLLECTION, ids).await?;
        Ok(docs.into_iter().map(T::from).collect())
    }

    pub async fn find_ids(&self, filter: &Filter) -> Result<IdSet> {
        self.store.find_ids(T::COLLECTION, filter).await
    }

    pub async fn find(&self, filter: &Filter, page: &PageRequest) -> Result<Page<T>> {
        Ok(self
            .store
            .find(T::COLLECTION, filter, page)
            .await?
            .map(T::from))
    }

    pub async fn update_one(&self, id: EntityId, patch: &Patch) -> Result<Option<T>> {
        Ok(self
            .store
            .update_by_id(T::COLLECTION, id, patch)
            .await?
            .map(T::from))
    }

    pub async fn update_many(&self, filter: &Filter, patch: &Patch) -> Result<u64> {
        self.store.update_many(T::COLLECTION, filter, patch).await
    }

    pub async fn delete_by_id(&self, id: EntityId) -> Result<bool> {
        self.store.delete_by_id(T::COLLECTION, id).await
    }
}
