//! PostgreSQL adapters for the order domain

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, InventoryItemId, PatientId, PortError};
use domain_orders::{CatalogItem, CatalogKind, InventoryPort, Order, OrderNumber, OrderStore};
use domain_patient::RecordEntry;

use super::check_pool;
use crate::repositories::{CatalogRepository, OrderRepository};

/// Order persistence backed by `medical_orders`
///
/// The table's primary key on `order_number` turns a lost allocation race
/// into `PortError::Conflict`. Orders created through the allocator share a
/// transaction with their `medical_record_entries` row.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
    repository: OrderRepository,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: OrderRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresOrderStore {}

#[async_trait]
impl HealthCheckable for PostgresOrderStore {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-order-store").await
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn exists_order_number(&self, number: OrderNumber) -> Result<bool, PortError> {
        self.repository.exists(number).await.map_err(PortError::from)
    }

    #[instrument(skip(self, order), fields(order_number = %order.number))]
    async fn insert(&self, order: &Order) -> Result<(), PortError> {
        debug!("inserting order");
        self.repository.insert(order).await.map_err(PortError::from)
    }

    #[instrument(skip(self, order, entry), fields(order_number = %order.number))]
    async fn insert_with_record(&self, order: &Order, entry: &RecordEntry) -> Result<(), PortError> {
        debug!("inserting order with medical record entry");
        self.repository
            .insert_with_record(order, entry)
            .await
            .map_err(PortError::from)
    }

    #[instrument(skip(self), fields(order_number = %number))]
    async fn find_by_number(&self, number: OrderNumber) -> Result<Order, PortError> {
        debug!("fetching order");
        self.repository.find_by_number(number).await.map_err(PortError::from)
    }

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, PortError> {
        self.repository.find_by_patient(patient_id).await.map_err(PortError::from)
    }

    async fn count(&self) -> Result<u64, PortError> {
        self.repository.count().await.map_err(PortError::from)
    }
}

/// Catalog prices backed by `inventory_items`
#[derive(Debug, Clone)]
pub struct PostgresInventoryAdapter {
    pool: PgPool,
    repository: CatalogRepository,
}

impl PostgresInventoryAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CatalogRepository::new(pool.clone()),
            pool,
        }
    }

    /// Registers or updates a catalog item
    pub async fn upsert(&self, item: &CatalogItem) -> Result<(), PortError> {
        self.repository.upsert(item).await.map_err(PortError::from)
    }
}

impl DomainPort for PostgresInventoryAdapter {}

#[async_trait]
impl HealthCheckable for PostgresInventoryAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-inventory-adapter").await
    }
}

#[async_trait]
impl InventoryPort for PostgresInventoryAdapter {
    #[instrument(skip(self), fields(kind = kind.as_str(), item_id = %id))]
    async fn find_item(&self, kind: CatalogKind, id: InventoryItemId) -> Result<CatalogItem, PortError> {
        debug!("fetching catalog item");
        self.repository.find_active(kind, id).await.map_err(PortError::from)
    }
}
