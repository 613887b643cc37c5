//! Core Kernel - Foundational types for the hospital engine
//!
//! This crate provides the building blocks shared by the patient, order and
//! billing domains:
//! - Money types with exact decimal arithmetic
//! - Calendar years and clocks in the hospital's timezone
//! - Typed identifiers
//! - Port infrastructure for swappable adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{CalendarYear, Clock, FixedClock, SharedClock, SystemClock, TemporalError, Timezone};
pub use identifiers::{PatientId, RecordEntryId, UserId, InventoryItemId, InvoiceId};
pub use ports::{PortError, DomainPort, AdapterHealth, HealthCheckable, HealthCheckResult};
pub use error::CoreError;
