//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter wraps one
//! or more repositories, translates `DatabaseError` into `PortError` and
//! reports pool health.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresOrderStore;
//! use domain_orders::OrderStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn OrderStore> = Arc::new(PostgresOrderStore::new(pool));
//! let order = store.find_by_number(number).await?;
//! ```

pub mod patient;
pub mod orders;
pub mod billing;

pub use patient::{PostgresMedicalRecordAdapter, PostgresPatientAdapter, PostgresStaffAdapter};
pub use orders::{PostgresInventoryAdapter, PostgresOrderStore};
pub use billing::{PostgresCopaymentLedger, PostgresInvoiceStore};

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` against the pool and times it
pub(crate) async fn check_pool(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = crate::pool::ping(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
