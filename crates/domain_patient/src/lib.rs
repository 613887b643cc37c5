//! Patient Domain
//!
//! The actors and records the order and billing engine consults but does
//! not own:
//!
//! - **Patients** and the insurance policy that decides whether a bill is
//!   covered at all
//! - **Staff users** and their role (only doctors may issue orders)
//! - **Access control**: a static role → permission table
//! - **Medical records**: an append-only log of dated clinical entries
//!
//! Lookups go through the ports in [`ports`]; in-memory adapters are
//! available behind the `mock` feature.

pub mod patient;
pub mod staff;
pub mod access;
pub mod medical_record;
pub mod error;
pub mod ports;

pub use patient::{Patient, InsurancePolicy};
pub use staff::{User, Role};
pub use access::{AccessControl, AccessError, Action, Permission, Resource};
pub use medical_record::RecordEntry;
pub use error::PatientError;
pub use ports::{PatientPort, StaffPort, MedicalRecordPort};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockPatientPort, MockStaffPort, MockMedicalRecordPort};
