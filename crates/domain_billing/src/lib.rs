//! Billing Domain - Copayments Under an Annual Ceiling
//!
//! Decides how the cost of a billed order is split between the patient and
//! the insurer, and keeps the per-patient, per-year copayment totals that
//! make that decision.
//!
//! # Rules
//!
//! - A patient without an active policy on the billing date pays the full
//!   cost
//! - An insured patient pays the standard copayment per billed order,
//!   until the year's copayments reach the annual ceiling
//! - The billing that crosses the ceiling is charged only the remaining
//!   headroom; later billings that year are fully covered
//!
//! All amounts are exact decimals ([`core_kernel::Money`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingCalculator, BillingPolicy};
//!
//! let calculator = BillingCalculator::new(patients, ledger, BillingPolicy::default(), clock, tz);
//! let result = calculator.calculate(patient_id, Money::from_units(200_000, Currency::COP)).await?;
//!
//! assert_eq!(result.copayment_charged, Money::from_units(50_000, Currency::COP));
//! assert_eq!(result.insurance_coverage, Money::from_units(150_000, Currency::COP));
//! ```

pub mod policy;
pub mod ledger;
pub mod calculator;
pub mod invoice;
pub mod ports;
pub mod service;
pub mod error;

pub use policy::BillingPolicy;
pub use ledger::{CappedCharge, CopaymentLedger, LedgerCharge};
pub use calculator::{BillingBranch, BillingCalculator, BillingResult};
pub use invoice::Invoice;
pub use ports::InvoiceStore;
pub use service::BillingService;
pub use error::BillingError;
#[cfg(any(test, feature = "mock"))]
pub use ledger::mock::MockCopaymentLedger;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockInvoiceStore;
