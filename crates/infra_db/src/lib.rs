//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the hospital order and billing engine, built
//! on SQLx.
//!
//! # Architecture
//!
//! - [`repositories`] own the SQL and map rows to domain types
//! - [`adapters`] implement the domain ports on top of the repositories
//! - [`pool`] builds the connection pool and applies migrations
//!
//! Two invariants are enforced by the schema rather than by application
//! code: order numbers are unique (`medical_orders` primary key) and an
//! annual copayment row is locked while a capped charge is applied to it.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresOrderStore;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/hospital")).await?;
//! run_migrations(&pool).await?;
//! let orders = PostgresOrderStore::new(pool.clone());
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, ping, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
