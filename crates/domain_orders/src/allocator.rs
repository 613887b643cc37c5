//! Order number allocation
//!
//! Allocation probes candidate numbers starting from a rotating cursor and
//! hands each free-looking candidate to the store. The store's unique key
//! on the order number decides the winner: a `Conflict` means another
//! writer got there first and the next candidate is tried. After one full
//! pass over the space without success the space is exhausted.
//!
//! The order's medical record entry is written in the same store call as
//! the order, so an order never exists without its entry.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, instrument};

use domain_patient::RecordEntry;

use crate::error::OrderError;
use crate::order::{Order, OrderDraft};
use crate::order_number::{OrderNumber, OrderNumberSpace};
use crate::ports::OrderStore;

/// Hands out unique order numbers
pub struct OrderNumberAllocator {
    store: Arc<dyn OrderStore>,
    space: OrderNumberSpace,
    /// Next candidate to probe; only a hint, never a reservation
    cursor: AtomicU32,
}

impl OrderNumberAllocator {
    pub fn new(store: Arc<dyn OrderStore>, space: OrderNumberSpace) -> Self {
        Self {
            store,
            space,
            cursor: AtomicU32::new(OrderNumber::MIN),
        }
    }

    pub fn space(&self) -> OrderNumberSpace {
        self.space
    }

    /// Returns a number no stored order currently uses
    ///
    /// The number is not reserved. Callers that persist an order must use
    /// [`allocate_and_insert`](Self::allocate_and_insert), which closes the
    /// window between this check and the insert.
    #[instrument(skip(self))]
    pub async fn allocate(&self) -> Result<OrderNumber, OrderError> {
        let start = self.cursor.load(Ordering::Relaxed);
        for offset in 0..self.space.capacity() {
            let candidate = self.space.nth_from(start, offset);
            if !self.store.exists_order_number(candidate).await? {
                debug!(order_number = %candidate, "found free order number");
                return Ok(candidate);
            }
        }
        Err(self.exhausted())
    }

    /// Allocates a number and inserts the order under it in one step
    ///
    /// `record` builds the medical record entry for each candidate, since
    /// the entry names the order number.
    #[instrument(skip(self, draft, record), fields(patient_id = %draft.patient_id))]
    pub async fn allocate_and_insert<F>(
        &self,
        draft: OrderDraft,
        created_at: DateTime<Utc>,
        record: F,
    ) -> Result<Order, OrderError>
    where
        F: Fn(&Order) -> Result<RecordEntry, OrderError> + Send + Sync,
    {
        let start = self.cursor.load(Ordering::Relaxed);
        let mut order = draft.into_order(self.space.nth_from(start, 0), created_at);

        for offset in 0..self.space.capacity() {
            let candidate = self.space.nth_from(start, offset);
            if self.store.exists_order_number(candidate).await? {
                continue;
            }

            order.number = candidate;
            let entry = record(&order)?;
            match self.store.insert_with_record(&order, &entry).await {
                Ok(()) => {
                    self.cursor.store(self.space.successor(candidate), Ordering::Relaxed);
                    debug!(order_number = %candidate, attempts = offset + 1, "order number assigned");
                    return Ok(order);
                }
                Err(e) if e.is_conflict() => {
                    debug!(order_number = %candidate, "order number taken concurrently, probing next");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(self.exhausted())
    }

    fn exhausted(&self) -> OrderError {
        error!(capacity = self.space.capacity(), "order number space exhausted");
        OrderError::NumberSpaceExhausted {
            capacity: self.space.capacity(),
        }
    }
}
