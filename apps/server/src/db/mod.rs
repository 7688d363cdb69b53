//! Persistence layer: document model, store backends and typed repositories

pub mod document;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod traits;

pub use document::{
    Clause, Collection, Document, Filter, Page, PageRequest, Patch, SetField, SetOp, SortField,
};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use repository::{
    ClinicRepository, DoctorRepository, HealthServiceRepository, Repository, StoredEntity,
};
pub use traits::DocumentStore;
