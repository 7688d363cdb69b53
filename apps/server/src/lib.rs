//! Clinic Registry - REST backend for clinics, doctors and health services
//!
//! Request flow: router -> validation -> authorization -> entity service ->
//! (relationship cascades through peer services) -> document store.
//!
//! The only non-trivial logic is the cross-reference maintenance in
//! [`services::integrity`], which keeps clinic/doctor links mirrored and each
//! clinic's health-service set equal to the union of its doctors' services.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
