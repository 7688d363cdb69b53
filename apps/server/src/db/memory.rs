//! In-memory (in-process) document store.
//!
//! Keeps every collection in a map behind one async `RwLock`, so each call is
//! atomic with respect to every other call. Data is lost on restart.
//!
//! Primary use-case: deterministic integration tests and local development
//! without a database.

use super::{
    document::{Collection, Document, Filter, Page, PageRequest, Patch, SortField},
    traits::DocumentStore,
};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use registry_models::{EntityId, IdSet};
use std::collections::HashMap;
use tokio::sync::RwLock;

type Table = HashMap<EntityId, Document>;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Table>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(table: &Table, name: &str, except: Option<EntityId>) -> bool {
    table
        .values()
        .any(|doc| doc.name == name && Some(doc.id) != except)
}

fn duplicate_name(collection: Collection, name: &str) -> Error {
    Error::Validation(format!(
        "{} name '{}' is already taken",
        collection.entity_name(),
        name
    ))
}

fn sort_documents(docs: &mut [Document], page: &PageRequest) {
    docs.sort_by(|a, b| {
        let ordering = match page.sort_by {
            SortField::Name => a.name.cmp(&b.name),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
        .then_with(|| a.id.cmp(&b.id));
        if page.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: Collection, document: Document) -> Result<Document> {
        let mut collections = self.collections.write().await;
        let table = collections.entry(collection).or_default();

        if collection.has_unique_name() && name_taken(table, &document.name, None) {
            return Err(duplicate_name(collection, &document.name));
        }
        if table.contains_key(&document.id) {
            return Err(Error::Storage(format!(
                "duplicate {} id {}",
                collection.entity_name(),
                document.id
            )));
        }

        table.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, collection: Collection, id: EntityId) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|table| table.get(&id))
            .cloned())
    }

    async fn find_by_ids(&self, collection: Collection, ids: &IdSet) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(table) = collections.get(&collection) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| table.get(id).cloned()).collect())
    }

    async fn find_ids(&self, collection: Collection, filter: &Filter) -> Result<IdSet> {
        filter.check(collection)?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|table| {
                table
                    .values()
                    .filter(|doc| filter.matches(doc))
                    .map(|doc| doc.id)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        page: &PageRequest,
    ) -> Result<Page<Document>> {
        filter.check(collection)?;

        let collections = self.collections.read().await;
        let mut matching: Vec<Document> = collections
            .get(&collection)
            .map(|table| {
                table
                    .values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        sort_documents(&mut matching, page);
        let total = matching.len() as u64;
        let results = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(Page::new(results, page, total))
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: EntityId,
        patch: &Patch,
    ) -> Result<Option<Document>> {
        patch.check(collection)?;

        let mut collections = self.collections.write().await;
        let table = collections.entry(collection).or_default();

        if let Some(name) = &patch.name {
            if collection.has_unique_name() && name_taken(table, name, Some(id)) {
                return Err(duplicate_name(collection, name));
            }
        }

        let Some(doc) = table.get_mut(&id) else {
            return Ok(None);
        };
        if patch.apply(doc) {
            doc.updated_at = Utc::now();
        }
        Ok(Some(doc.clone()))
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64> {
        filter.check(collection)?;
        patch.check(collection)?;
        if patch.name.is_some() && collection.has_unique_name() {
            return Err(Error::Storage(format!(
                "cannot bulk-rename {} documents with unique names",
                collection.entity_name()
            )));
        }

        let mut collections = self.collections.write().await;
        let Some(table) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        let now = Utc::now();
        let mut modified = 0;
        for doc in table.values_mut().filter(|doc| filter.matches(doc)) {
            if patch.apply(doc) {
                doc.updated_at = now;
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn delete_by_id(&self, collection: Collection, id: EntityId) -> Result<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&collection)
            .map(|table| table.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn health_check(&self) -> Result<serde_json::Value> {
        let collections = self.collections.read().await;
        let count = |c: Collection| collections.get(&c).map(Table::len).unwrap_or(0);
        Ok(serde_json::json!({
            "backend": "memory",
            "status": "ok",
            "documents": {
                "clinics": count(Collection::Clinics),
                "doctors": count(Collection::Doctors),
                "healthServices": count(Collection::HealthServices),
            }
        }))
    }
}
