//! Order Domain Ports
//!
//! - [`InventoryPort`] reads catalog prices
//! - [`OrderStore`] persists orders and is the sole authority on which
//!   order numbers are taken
//!
//! `OrderStore::insert` must reject a duplicate number with
//! `PortError::Conflict`; the allocator relies on that to resolve races
//! between concurrent order creations.
//!
//! `OrderStore::insert_with_record` stores an order and the medical record
//! entry it produces as one unit: a failed append leaves no order behind.

use async_trait::async_trait;

use core_kernel::{DomainPort, InventoryItemId, PatientId, PortError};
use domain_patient::RecordEntry;

use crate::catalog::{CatalogItem, CatalogKind};
use crate::order::Order;
use crate::order_number::OrderNumber;

/// Catalog lookup
#[async_trait]
pub trait InventoryPort: DomainPort {
    /// Retrieves an active item of the given kind, or `PortError::NotFound`
    async fn find_item(&self, kind: CatalogKind, id: InventoryItemId) -> Result<CatalogItem, PortError>;

    async fn find_medication(&self, id: InventoryItemId) -> Result<CatalogItem, PortError> {
        self.find_item(CatalogKind::Medication, id).await
    }

    async fn find_procedure(&self, id: InventoryItemId) -> Result<CatalogItem, PortError> {
        self.find_item(CatalogKind::Procedure, id).await
    }

    async fn find_diagnostic(&self, id: InventoryItemId) -> Result<CatalogItem, PortError> {
        self.find_item(CatalogKind::Diagnostic, id).await
    }
}

/// Order persistence
#[async_trait]
pub trait OrderStore: DomainPort {
    /// Whether an order with this number exists
    async fn exists_order_number(&self, number: OrderNumber) -> Result<bool, PortError>;

    /// Inserts a new order; `PortError::Conflict` if the number is taken
    async fn insert(&self, order: &Order) -> Result<(), PortError>;

    /// Inserts a new order and appends its medical record entry atomically
    ///
    /// Either both are stored or neither is. `PortError::Conflict` if the
    /// number is taken.
    async fn insert_with_record(&self, order: &Order, entry: &RecordEntry) -> Result<(), PortError>;

    /// Retrieves an order, or `PortError::NotFound`
    async fn find_by_number(&self, number: OrderNumber) -> Result<Order, PortError>;

    /// All orders of a patient, oldest first
    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, PortError>;

    /// Number of stored orders
    async fn count(&self) -> Result<u64, PortError>;
}

/// In-memory implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use domain_patient::{MedicalRecordPort, MockMedicalRecordPort};
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::fmt;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory catalog
    #[derive(Debug, Default)]
    pub struct MockInventoryPort {
        items: Arc<RwLock<HashMap<InventoryItemId, CatalogItem>>>,
    }

    impl MockInventoryPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with catalog items
        pub async fn with_items(items: Vec<CatalogItem>) -> Self {
            let port = Self::new();
            for item in items {
                port.upsert(item).await;
            }
            port
        }

        /// Adds or reprices an item
        pub async fn upsert(&self, item: CatalogItem) {
            self.items.write().await.insert(item.id, item);
        }
    }

    impl DomainPort for MockInventoryPort {}

    #[async_trait]
    impl InventoryPort for MockInventoryPort {
        async fn find_item(&self, kind: CatalogKind, id: InventoryItemId) -> Result<CatalogItem, PortError> {
            self.items
                .read()
                .await
                .get(&id)
                .filter(|item| item.kind == kind && item.active)
                .cloned()
                .ok_or_else(|| PortError::not_found(kind.entity_name(), id))
        }
    }

    /// In-memory order store with a unique key on the order number
    ///
    /// Numbers registered with [`MockOrderStore::with_hidden_numbers`] are
    /// invisible to `exists_order_number` yet still reject inserts, which
    /// reproduces another process winning the race between check and insert.
    /// Record entries go to the medical record port given to
    /// [`MockOrderStore::with_records`], or to a private one.
    pub struct MockOrderStore {
        orders: Arc<RwLock<BTreeMap<OrderNumber, Order>>>,
        hidden: Arc<RwLock<HashSet<OrderNumber>>>,
        records: Arc<dyn MedicalRecordPort>,
    }

    impl MockOrderStore {
        pub fn new() -> Self {
            Self::with_records(Arc::new(MockMedicalRecordPort::new()))
        }

        /// Appends record entries to a shared medical record port
        pub fn with_records(records: Arc<dyn MedicalRecordPort>) -> Self {
            Self {
                orders: Arc::default(),
                hidden: Arc::default(),
                records,
            }
        }

        pub async fn with_hidden_numbers(numbers: Vec<OrderNumber>) -> Self {
            let store = Self::new();
            store.hidden.write().await.extend(numbers);
            store
        }

        async fn ensure_free(&self, orders: &BTreeMap<OrderNumber, Order>, number: OrderNumber) -> Result<(), PortError> {
            if orders.contains_key(&number) || self.hidden.read().await.contains(&number) {
                return Err(PortError::conflict(format!("order number {} already exists", number)));
            }
            Ok(())
        }
    }

    impl Default for MockOrderStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl fmt::Debug for MockOrderStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("MockOrderStore").finish_non_exhaustive()
        }
    }

    impl DomainPort for MockOrderStore {}

    #[async_trait]
    impl OrderStore for MockOrderStore {
        async fn exists_order_number(&self, number: OrderNumber) -> Result<bool, PortError> {
            Ok(self.orders.read().await.contains_key(&number))
        }

        async fn insert(&self, order: &Order) -> Result<(), PortError> {
            let mut orders = self.orders.write().await;
            self.ensure_free(&orders, order.number).await?;
            orders.insert(order.number, order.clone());
            Ok(())
        }

        async fn insert_with_record(&self, order: &Order, entry: &RecordEntry) -> Result<(), PortError> {
            // The write lock spans the append, so a failed append never exposes the order
            let mut orders = self.orders.write().await;
            self.ensure_free(&orders, order.number).await?;
            self.records.append_entry(entry).await?;
            orders.insert(order.number, order.clone());
            Ok(())
        }

        async fn find_by_number(&self, number: OrderNumber) -> Result<Order, PortError> {
            self.orders
                .read()
                .await
                .get(&number)
                .cloned()
                .ok_or_else(|| PortError::not_found("Order", number))
        }

        async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, PortError> {
            let mut orders: Vec<Order> = self
                .orders
                .read()
                .await
                .values()
                .filter(|o| o.patient_id == patient_id)
                .cloned()
                .collect();
            orders.sort_by_key(|o| o.created_at);
            Ok(orders)
        }

        async fn count(&self) -> Result<u64, PortError> {
            Ok(self.orders.read().await.len() as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use core_kernel::{Currency, Money};

    #[tokio::test]
    async fn test_inventory_lookup_respects_kind() {
        let item = CatalogItem::medication("Amoxicillin 500mg", Money::from_units(1_200, Currency::COP));
        let port = MockInventoryPort::with_items(vec![item.clone()]).await;

        assert_eq!(port.find_medication(item.id).await.unwrap().name, "Amoxicillin 500mg");

        let err = port.find_procedure(item.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound { ref entity_type, .. } if entity_type == "Procedure"));
    }

    #[tokio::test]
    async fn test_retired_items_not_found() {
        let mut item = CatalogItem::diagnostic("Chest X-ray", Money::from_units(60_000, Currency::COP));
        item.active = false;
        let port = MockInventoryPort::with_items(vec![item.clone()]).await;

        assert!(port.find_diagnostic(item.id).await.unwrap_err().is_not_found());
    }
}
