//! PostgreSQL-backed `DocumentStore` implementation
//!
//! One table per collection; identifier sets live in `UUID[]` columns and set
//! operations are expressed as array SQL so every update is a single statement.

use async_trait::async_trait;
use chrono::Utc;
use registry_models::{EntityId, IdSet};
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{
    document::{Clause, Collection, Document, Filter, Page, PageRequest, Patch, SetOp, SortField},
    traits::DocumentStore,
};
use crate::{Error, Result};

#[derive(Clone)]
pub struct PostgresDocumentStore {
    pub(crate) pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_columns(collection: Collection) -> String {
        let mut columns = String::from("id, name, created_at, updated_at");
        for field in collection.set_fields() {
            columns.push_str(", ");
            columns.push_str(field.column());
        }
        columns
    }

    fn row_to_document(collection: Collection, row: &PgRow) -> Result<Document> {
        let id: Uuid = row.try_get("id")?;
        let mut doc = Document {
            id: EntityId::from(id),
            name: row.try_get("name")?,
            doctors: IdSet::new(),
            clinics: IdSet::new(),
            health_services: IdSet::new(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        };
        for field in collection.set_fields() {
            let ids: Vec<Uuid> = row.try_get(field.column())?;
            *doc.set_mut(*field) = IdSet::from(ids);
        }
        Ok(doc)
    }

    fn push_where(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
        if filter.clauses().is_empty() {
            return;
        }
        builder.push(" WHERE ");
        for (i, clause) in filter.clauses().iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            match clause {
                Clause::Ids(ids) => {
                    builder.push("id = ANY(");
                    builder.push_bind(ids.to_uuids());
                    builder.push(")");
                }
                Clause::NameEquals(name) => {
                    builder.push("name = ");
                    builder.push_bind(name.clone());
                }
                Clause::Contains(field, id) => {
                    builder.push(format!("{} @> ARRAY[", field.column()));
                    builder.push_bind(id.as_uuid());
                    builder.push("]::uuid[]");
                }
            }
        }
    }

    /// `SET updated_at = now(), ...` for a checked patch. Callers pair it with
    /// `push_changed` so unchanged rows keep their timestamp.
    fn push_set(builder: &mut QueryBuilder<'_, Postgres>, patch: &Patch) {
        builder.push(" SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(name) = &patch.name {
            builder.push(", name = ");
            builder.push_bind(name.clone());
        }

        for op in &patch.ops {
            let column = op.field().column();
            builder.push(format!(", {column} = "));
            match op {
                SetOp::AddToSet(_, ids) => {
                    builder.push(format!("ARRAY(SELECT DISTINCT e FROM unnest({column} || "));
                    builder.push_bind(ids.to_uuids());
                    builder.push("::uuid[]) AS e)");
                }
                SetOp::Pull(_, ids) => {
                    builder.push(format!(
                        "ARRAY(SELECT e FROM unnest({column}) AS e WHERE NOT (e = ANY("
                    ));
                    builder.push_bind(ids.to_uuids());
                    builder.push("::uuid[])))");
                }
                SetOp::Replace(_, ids) => {
                    builder.push_bind(ids.to_uuids());
                    builder.push("::uuid[]");
                }
            }
        }
    }

    /// Predicate that holds only for rows the patch would change. Set fields are
    /// compared as sets, so reordering alone never counts as a change.
    fn push_changed(builder: &mut QueryBuilder<'_, Postgres>, patch: &Patch) {
        if patch.is_empty() {
            builder.push("FALSE");
            return;
        }

        builder.push("(");
        let mut first = true;

        if let Some(name) = &patch.name {
            builder.push("name IS DISTINCT FROM ");
            builder.push_bind(name.clone());
            first = false;
        }

        for op in &patch.ops {
            if !first {
                builder.push(" OR ");
            }
            first = false;
            let column = op.field().column();
            match op {
                SetOp::AddToSet(_, ids) => {
                    builder.push(format!("NOT ({column} @> "));
                    builder.push_bind(ids.to_uuids());
                    builder.push("::uuid[])");
                }
                SetOp::Pull(_, ids) => {
                    builder.push(format!("{column} && "));
                    builder.push_bind(ids.to_uuids());
                    builder.push("::uuid[]");
                }
                SetOp::Replace(_, ids) => {
                    builder.push(format!("NOT ({column} @> "));
                    builder.push_bind(ids.to_uuids());
                    builder.push(format!("::uuid[] AND {column} <@ "));
                    builder.push_bind(ids.to_uuids());
                    builder.push("::uuid[])");
                }
            }
        }
        builder.push(")");
    }

    fn map_write_error(collection: Collection, name: Option<&str>, err: sqlx::Error) -> Error {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Error::Validation(format!(
                    "{} name '{}' is already taken",
                    collection.entity_name(),
                    name.unwrap_or_default()
                ));
            }
        }
        Error::Database(err)
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert(&self, collection: Collection, document: Document) -> Result<Document> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} (id, name, created_at, updated_at",
            collection.table()
        ));
        for field in collection.set_fields() {
            builder.push(format!(", {}", field.column()));
        }
        builder.push(") VALUES (");
        {
            let mut values = builder.separated(", ");
            values.push_bind(document.id.as_uuid());
            values.push_bind(document.name.clone());
            values.push_bind(document.created_at);
            values.push_bind(document.updated_at);
            for field in collection.set_fields() {
                values.push_bind(document.set(*field).to_uuids());
            }
        }
        builder.push(format!(") RETURNING {}", Self::select_columns(collection)));

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, Some(&document.name), e))?;

        Self::row_to_document(collection, &row)
    }

    async fn find_by_id(&self, collection: Collection, id: EntityId) -> Result<Option<Document>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            Self::select_columns(collection),
            collection.table()
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|r| Self::row_to_document(collection, &r))
            .transpose()
    }

    async fn find_by_ids(&self, collection: Collection, ids: &IdSet) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ANY($1)",
            Self::select_columns(collection),
            collection.table()
        );
        let rows = sqlx::query(&sql)
            .bind(ids.to_uuids())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter()
            .map(|r| Self::row_to_document(collection, r))
            .collect()
    }

    async fn find_ids(&self, collection: Collection, filter: &Filter) -> Result<IdSet> {
        filter.check(collection)?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT id FROM {}", collection.table()));
        Self::push_where(&mut builder, filter);

        let ids: Vec<Uuid> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(IdSet::from(ids))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        page: &PageRequest,
    ) -> Result<Page<Document>> {
        filter.check(collection)?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", collection.table()));
        Self::push_where(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            Self::select_columns(collection),
            collection.table()
        ));
        Self::push_where(&mut builder, filter);

        // Sort column and direction come from enums, never from user input.
        let column = match page.sort_by {
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
        };
        let order = if page.descending { "DESC" } else { "ASC" };
        builder.push(format!(" ORDER BY {column} {order}, id {order} LIMIT "));
        builder.push_bind(i64::from(page.limit));
        builder.push(" OFFSET ");
        builder.push_bind(page.offset() as i64);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let results = rows
            .iter()
            .map(|r| Self::row_to_document(collection, r))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(results, page, total.max(0) as u64))
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: EntityId,
        patch: &Patch,
    ) -> Result<Option<Document>> {
        patch.check(collection)?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE {}", collection.table()));
        Self::push_set(&mut builder, patch);
        builder.push(" WHERE id = ");
        builder.push_bind(id.as_uuid());
        builder.push(" AND ");
        Self::push_changed(&mut builder, patch);
        builder.push(format!(" RETURNING {}", Self::select_columns(collection)));

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, patch.name.as_deref(), e))?;

        match row {
            Some(row) => Self::row_to_document(collection, &row).map(Some),
            // Missing, or already in the patched state.
            None => self.find_by_id(collection, id).await,
        }
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64> {
        filter.check(collection)?;
        patch.check(collection)?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE {}", collection.table()));
        Self::push_set(&mut builder, patch);
        Self::push_where(&mut builder, filter);
        builder.push(if filter.clauses().is_empty() {
            " WHERE "
        } else {
            " AND "
        });
        Self::push_changed(&mut builder, patch);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            Error::Storage(format!("{} bulk update failed: {e}", collection.entity_name()))
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, collection: Collection, id: EntityId) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", collection.table());
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<serde_json::Value> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(serde_json::json!({
            "backend": "postgres",
            "status": "ok",
            "pool": {
                "size": self.pool.size(),
                "idle": self.pool.num_idle(),
            }
        }))
    }
}
