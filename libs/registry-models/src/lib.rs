//! Registry data model
//!
//! Three entity types share one identifier space:
//!
//! - [`Clinic`]: owns a mirrored set of doctor ids and a *derived* set of
//!   health-service ids.
//! - [`Doctor`]: owns a mirrored set of clinic ids and the *authoritative*
//!   set of health-service ids it provides.
//! - [`HealthService`]: a named service, unique by name.
//!
//! Relationship fields are modelled as [`IdSet`]s, never as ordered lists, so
//! union, difference and deduplication are explicit operations.
//!
//! No persistence or I/O lives here - just data representation and the pure
//! derivation rule behind clinic health-service recomputation.

pub mod entities;
pub mod id;

pub use entities::{derive_health_services, Clinic, Doctor, HealthService};
pub use id::{EntityId, IdSet, ParseIdError};
