//! Medical Orders Domain
//!
//! A doctor issues an order for a patient: medications, procedures, or
//! diagnostic studies. This crate turns such a request into a persisted,
//! numbered, costed [`Order`].
//!
//! # Order Numbers
//!
//! Every order receives a six-digit, zero-padded number (`000001` to
//! `999999`) that is unique across the whole order store. Numbers are
//! allocated by probing candidates and inserting; the store's uniqueness
//! constraint is the arbiter, so two concurrent allocations can never both
//! win the same number. A full space is a fatal capacity error.
//!
//! # Order Categories
//!
//! - **Diagnostic** orders contain only diagnostic-aid lines
//! - **Treatment** orders contain medications and/or procedures
//!
//! The two are mutually exclusive within one order.
//!
//! # Example
//!
//! ```rust,ignore
//! let order = aggregator.create_order(CreateOrderRequest {
//!     patient_id,
//!     doctor_id,
//!     diagnosis: Some("J18.9 Pneumonia".into()),
//!     lines: vec![OrderLineRequest::medication(amoxicillin, "500mg", "every 8h", 7, 21)],
//! }).await?;
//! assert_eq!(order.number.to_string().len(), 6);
//! ```

pub mod order_number;
pub mod lines;
pub mod order;
pub mod catalog;
pub mod allocator;
pub mod aggregator;
pub mod ports;
pub mod error;

pub use order_number::{OrderNumber, OrderNumberSpace};
pub use lines::{DiagnosticLine, MedicationLine, OrderLine, OrderLineRequest, ProcedureLine};
pub use order::{Order, OrderCategory, OrderDraft};
pub use catalog::{CatalogItem, CatalogKind};
pub use allocator::OrderNumberAllocator;
pub use aggregator::{CreateOrderRequest, OrderAggregator, OrderingConfig};
pub use ports::{InventoryPort, OrderStore};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockInventoryPort, MockOrderStore};
pub use error::OrderError;
