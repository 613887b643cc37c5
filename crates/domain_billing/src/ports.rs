//! Billing Domain Ports
//!
//! The copayment ledger port lives next to its domain rules in
//! [`crate::ledger`]; this module holds invoice persistence.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_orders::OrderNumber;

use crate::invoice::Invoice;

/// Invoice persistence
#[async_trait]
pub trait InvoiceStore: DomainPort {
    /// Saves a new invoice; `PortError::Conflict` if the order already has one
    async fn save(&self, invoice: &Invoice) -> Result<(), PortError>;

    /// The invoice of an order, if it was billed
    async fn find_by_order(&self, order_number: OrderNumber) -> Result<Option<Invoice>, PortError>;
}

/// In-memory implementation for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory invoice store with a unique key on the order number
    ///
    /// [`MockInvoiceStore::fail_next_saves`] makes saves fail with a
    /// connection error, for exercising error paths.
    #[derive(Debug, Default)]
    pub struct MockInvoiceStore {
        invoices: Arc<RwLock<HashMap<OrderNumber, Invoice>>>,
        failing_saves: AtomicU32,
    }

    impl MockInvoiceStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// The next `count` saves fail without storing anything
        pub fn fail_next_saves(&self, count: u32) {
            self.failing_saves.store(count, Ordering::SeqCst);
        }

        pub async fn len(&self) -> usize {
            self.invoices.read().await.len()
        }
    }

    impl DomainPort for MockInvoiceStore {}

    #[async_trait]
    impl InvoiceStore for MockInvoiceStore {
        async fn save(&self, invoice: &Invoice) -> Result<(), PortError> {
            let failing = self
                .failing_saves
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            if failing.is_ok() {
                return Err(PortError::connection("invoice store unavailable"));
            }

            let mut invoices = self.invoices.write().await;
            if invoices.contains_key(&invoice.order_number) {
                return Err(PortError::conflict(format!(
                    "order {} already invoiced",
                    invoice.order_number
                )));
            }
            invoices.insert(invoice.order_number, invoice.clone());
            Ok(())
        }

        async fn find_by_order(&self, order_number: OrderNumber) -> Result<Option<Invoice>, PortError> {
            Ok(self.invoices.read().await.get(&order_number).cloned())
        }
    }
}
