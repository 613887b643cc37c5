//! Repository implementations
//!
//! Each repository owns the SQL for one table group and maps rows to and
//! from domain types. Queries are built at runtime with `sqlx::query_as`
//! and `FromRow` row structs.

pub mod orders;
pub mod copayments;
pub mod invoices;
pub mod patients;
pub mod staff;
pub mod medical_records;
pub mod catalog;

pub use orders::OrderRepository;
pub use copayments::CopaymentRepository;
pub use invoices::InvoiceRepository;
pub use patients::PatientRepository;
pub use staff::StaffRepository;
pub use medical_records::MedicalRecordRepository;
pub use catalog::CatalogRepository;

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

use crate::error::DatabaseError;

/// Rebuilds a `Money` from its NUMERIC and CHAR(3) columns
pub(crate) fn money(amount: Decimal, currency: &str) -> Result<Money, DatabaseError> {
    let currency: Currency = currency.trim().parse().map_err(DatabaseError::corrupt)?;
    Ok(Money::new(amount, currency))
}
