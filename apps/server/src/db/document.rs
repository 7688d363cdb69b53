//! Storage-level documents, filters and patches
//!
//! Every collection stores the same document shape; collections differ only in
//! which identifier-set fields they carry and whether `name` is unique.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use registry_models::{Clinic, Doctor, EntityId, HealthService, IdSet};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Clinics,
    Doctors,
    HealthServices,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Clinics => "clinics",
            Self::Doctors => "doctors",
            Self::HealthServices => "health_services",
        }
    }

    /// Human-readable entity name used in error messages.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Clinics => "Clinic",
            Self::Doctors => "Doctor",
            Self::HealthServices => "HealthService",
        }
    }

    pub fn set_fields(&self) -> &'static [SetField] {
        match self {
            Self::Clinics => &[SetField::Doctors, SetField::HealthServices],
            Self::Doctors => &[SetField::Clinics, SetField::HealthServices],
            Self::HealthServices => &[],
        }
    }

    pub fn has_unique_name(&self) -> bool {
        matches!(self, Self::HealthServices)
    }

    fn check_field(&self, field: SetField) -> Result<()> {
        if self.set_fields().contains(&field) {
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "{} documents have no '{}' field",
                self.entity_name(),
                field.as_str()
            )))
        }
    }
}

/// Identifier-set fields a document may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetField {
    Doctors,
    Clinics,
    HealthServices,
}

impl SetField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Doctors => "doctors",
            Self::Clinics => "clinics",
            Self::HealthServices => "health_services",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctors => "doctors",
            Self::Clinics => "clinics",
            Self::HealthServices => "healthServices",
        }
    }
}

/// Stored representation shared by all collections. Set fields a collection
/// does not carry stay empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: EntityId,
    pub name: String,
    pub doctors: IdSet,
    pub clinics: IdSet,
    pub health_services: IdSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// A fresh document with a new id and empty relationship sets.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            name: name.into(),
            doctors: IdSet::new(),
            clinics: IdSet::new(),
            health_services: IdSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set(&self, field: SetField) -> &IdSet {
        match field {
            SetField::Doctors => &self.doctors,
            SetField::Clinics => &self.clinics,
            SetField::HealthServices => &self.health_services,
        }
    }

    pub fn set_mut(&mut self, field: SetField) -> &mut IdSet {
        match field {
            SetField::Doctors => &mut self.doctors,
            SetField::Clinics => &mut self.clinics,
            SetField::HealthServices => &mut self.health_services,
        }
    }
}

impl From<Document> for Clinic {
    fn from(doc: Document) -> Self {
        Clinic {
            id: doc.id,
            name: doc.name,
            doctors: doc.doctors,
            health_services: doc.health_services,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<Document> for Doctor {
    fn from(doc: Document) -> Self {
        Doctor {
            id: doc.id,
            name: doc.name,
            clinics: doc.clinics,
            health_services: doc.health_services,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<Document> for HealthService {
    fn from(doc: Document) -> Self {
        HealthService {
            id: doc.id,
            name: doc.name,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Ids(IdSet),
    NameEquals(String),
    /// The set field contains the given id.
    Contains(SetField, EntityId),
}

/// Conjunction of clauses. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn ids(ids: IdSet) -> Self {
        Self::all().and(Clause::Ids(ids))
    }

    pub fn contains(field: SetField, id: EntityId) -> Self {
        Self::all().and(Clause::Contains(field, id))
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Ids(ids) => ids.contains(&doc.id),
            Clause::NameEquals(name) => &doc.name == name,
            Clause::Contains(field, id) => doc.set(*field).contains(id),
        })
    }

    pub fn check(&self, collection: Collection) -> Result<()> {
        for clause in &self.clauses {
            if let Clause::Contains(field, _) = clause {
                collection.check_field(*field)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetOp {
    /// Union the ids into the field.
    AddToSet(SetField, IdSet),
    /// Remove the ids from the field.
    Pull(SetField, IdSet),
    /// Overwrite the field.
    Replace(SetField, IdSet),
}

impl SetOp {
    pub fn field(&self) -> SetField {
        match self {
            Self::AddToSet(field, _) | Self::Pull(field, _) | Self::Replace(field, _) => *field,
        }
    }
}

/// Field-level update applied to each matching document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub name: Option<String>,
    pub ops: Vec<SetOp>,
}

impl Patch {
    pub fn set_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ops: Vec::new(),
        }
    }

    pub fn add_to_set(field: SetField, ids: IdSet) -> Self {
        Self::default().and(SetOp::AddToSet(field, ids))
    }

    pub fn pull(field: SetField, ids: IdSet) -> Self {
        Self::default().and(SetOp::Pull(field, ids))
    }

    pub fn replace(field: SetField, ids: IdSet) -> Self {
        Self::default().and(SetOp::Replace(field, ids))
    }

    pub fn and(mut self, op: SetOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.ops.is_empty()
    }

    /// Every field must exist on the collection and appear at most once.
    pub fn check(&self, collection: Collection) -> Result<()> {
        let mut seen = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let field = op.field();
            collection.check_field(field)?;
            if seen.contains(&field) {
                return Err(Error::Internal(format!(
                    "patch touches '{}' more than once",
                    field.as_str()
                )));
            }
            seen.push(field);
        }
        Ok(())
    }

    /// Apply to a document in place. Returns `true` if any field changed.
    pub fn apply(&self, doc: &mut Document) -> bool {
        let mut changed = false;
        if let Some(name) = &self.name {
            if &doc.name != name {
                doc.name = name.clone();
                changed = true;
            }
        }
        for op in &self.ops {
            changed |= match op {
                SetOp::AddToSet(field, ids) => doc.set_mut(*field).add_all(ids),
                SetOp::Pull(field, ids) => doc.set_mut(*field).pull_all(ids),
                SetOp::Replace(field, ids) => {
                    let target = doc.set_mut(*field);
                    if target != ids {
                        *target = ids.clone();
                        true
                    } else {
                        false
                    }
                }
            };
        }
        changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub descending: bool,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_by: SortField::CreatedAt,
            descending: false,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub total_results: u64,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, request: &PageRequest, total_results: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            results,
            page: request.page,
            limit: request.limit,
            total_pages: total_results.div_ceil(limit),
            total_results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}
