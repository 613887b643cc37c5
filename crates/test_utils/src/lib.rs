//! Test Utilities Crate
//!
//! Shared test infrastructure for the hospital order and billing engine.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built patients, staff, catalog items and instants
//! - `builders`: Builders for patients, order requests and stored orders
//! - `hospital`: [`TestHospital`], the whole engine wired onto in-memory ports
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertions for billing and numbering invariants
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod hospital;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use hospital::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
