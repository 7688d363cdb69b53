//! Document store trait definition

use super::document::{Collection, Document, Filter, Page, PageRequest, Patch};
use crate::Result;
use async_trait::async_trait;
use registry_models::{EntityId, IdSet};

/// Abstract interface for document persistence.
///
/// Single-document operations are atomic read-modify-writes. `update_many` is
/// atomic relative to its filter: every document matching at call time is
/// updated. Nothing spans more than one call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with `Error::Validation` when the
    /// collection requires unique names and the name is taken.
    async fn insert(&self, collection: Collection, document: Document) -> Result<Document>;

    async fn find_by_id(&self, collection: Collection, id: EntityId) -> Result<Option<Document>>;

    /// Fetch every document whose id is in `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, collection: Collection, ids: &IdSet) -> Result<Vec<Document>>;

    /// Ids of every document matching `filter`, unpaged.
    async fn find_ids(&self, collection: Collection, filter: &Filter) -> Result<IdSet>;

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        page: &PageRequest,
    ) -> Result<Page<Document>>;

    /// Apply `patch` to one document and return it, or `None` if it does not exist.
    async fn update_by_id(
        &self,
        collection: Collection,
        id: EntityId,
        patch: &Patch,
    ) -> Result<Option<Document>>;

    /// Apply `patch` to every matching document. Returns the number of
    /// documents whose content changed; driver-level failures surface as
    /// `Error::Storage`.
    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64>;

    /// Returns `true` if a document was removed.
    async fn delete_by_id(&self, collection: Collection, id: EntityId) -> Result<bool>;

    /// Health check
    async fn health_check(&self) -> Result<serde_json::Value>;
}
