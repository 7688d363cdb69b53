//! Request bodies and list queries accepted by the HTTP API

pub mod query;
pub mod requests;

pub use query::{ClinicListQuery, DoctorListQuery, HealthServiceListQuery, ListQuery};
pub use requests::{DoctorLinkRequest, HealthServiceLinkRequest, NameRequest};
