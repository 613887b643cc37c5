//! Patient Domain Ports
//!
//! Lookup and append interfaces the order and billing services depend on.
//! Application services hold them as `Arc<dyn ...>`:
//!
//! ```rust,ignore
//! pub struct OrderAggregator {
//!     patients: Arc<dyn PatientPort>,
//!     staff: Arc<dyn StaffPort>,
//!     records: Arc<dyn MedicalRecordPort>,
//!     // ...
//! }
//! ```
//!
//! The PostgreSQL adapters live in `infra_db`; in-memory adapters for tests
//! are in [`mock`].

use async_trait::async_trait;

use core_kernel::{DomainPort, PatientId, PortError, UserId};

use crate::medical_record::RecordEntry;
use crate::patient::Patient;
use crate::staff::User;

/// Patient lookup
#[async_trait]
pub trait PatientPort: DomainPort {
    /// Retrieves a patient by ID, or `PortError::NotFound`
    async fn find_patient(&self, id: PatientId) -> Result<Patient, PortError>;

    /// Registers or updates a patient
    async fn save_patient(&self, patient: &Patient) -> Result<(), PortError>;
}

/// Staff user lookup
#[async_trait]
pub trait StaffPort: DomainPort {
    /// Retrieves a user by ID, or `PortError::NotFound`
    async fn find_user(&self, id: UserId) -> Result<User, PortError>;

    /// Registers or updates a user
    async fn save_user(&self, user: &User) -> Result<(), PortError>;
}

/// Append-only medical record log
#[async_trait]
pub trait MedicalRecordPort: DomainPort {
    /// Appends an entry to the patient's record
    async fn append_entry(&self, entry: &RecordEntry) -> Result<(), PortError>;

    /// All entries of a patient, oldest first
    async fn entries_for(&self, patient_id: PatientId) -> Result<Vec<RecordEntry>, PortError>;
}

/// In-memory implementations for testing
///
/// These adapters keep their data in `tokio::sync::RwLock`-guarded maps and
/// are useful for unit testing without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;

    /// In-memory patient registry
    #[derive(Debug, Default)]
    pub struct MockPatientPort {
        patients: Arc<RwLock<HashMap<PatientId, Patient>>>,
    }

    impl MockPatientPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with patients for testing
        pub async fn with_patients(patients: Vec<Patient>) -> Self {
            let port = Self::new();
            for patient in patients {
                port.patients.write().await.insert(patient.id, patient);
            }
            port
        }
    }

    impl DomainPort for MockPatientPort {}

    #[async_trait]
    impl PatientPort for MockPatientPort {
        async fn find_patient(&self, id: PatientId) -> Result<Patient, PortError> {
            self.patients
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Patient", id))
        }

        async fn save_patient(&self, patient: &Patient) -> Result<(), PortError> {
            self.patients.write().await.insert(patient.id, patient.clone());
            Ok(())
        }
    }

    /// In-memory staff directory
    #[derive(Debug, Default)]
    pub struct MockStaffPort {
        users: Arc<RwLock<HashMap<UserId, User>>>,
    }

    impl MockStaffPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with users for testing
        pub async fn with_users(users: Vec<User>) -> Self {
            let port = Self::new();
            for user in users {
                port.users.write().await.insert(user.id, user);
            }
            port
        }
    }

    impl DomainPort for MockStaffPort {}

    #[async_trait]
    impl StaffPort for MockStaffPort {
        async fn find_user(&self, id: UserId) -> Result<User, PortError> {
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn save_user(&self, user: &User) -> Result<(), PortError> {
            self.users.write().await.insert(user.id, user.clone());
            Ok(())
        }
    }

    /// In-memory medical record log
    ///
    /// `fail_appends` makes every append fail, for exercising error paths.
    #[derive(Debug, Default)]
    pub struct MockMedicalRecordPort {
        entries: Arc<RwLock<Vec<RecordEntry>>>,
        fail_appends: AtomicBool,
    }

    impl MockMedicalRecordPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_fail_appends(&self, fail: bool) {
            self.fail_appends.store(fail, Ordering::SeqCst);
        }

        /// Total number of entries across all patients
        pub async fn len(&self) -> usize {
            self.entries.read().await.len()
        }
    }

    impl DomainPort for MockMedicalRecordPort {}

    #[async_trait]
    impl MedicalRecordPort for MockMedicalRecordPort {
        async fn append_entry(&self, entry: &RecordEntry) -> Result<(), PortError> {
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(PortError::connection("medical record store unavailable"));
            }
            self.entries.write().await.push(entry.clone());
            Ok(())
        }

        async fn entries_for(&self, patient_id: PatientId) -> Result<Vec<RecordEntry>, PortError> {
            Ok(self
                .entries
                .read()
                .await
                .iter()
                .filter(|e| e.patient_id == patient_id)
                .cloned()
                .collect())
        }
    }
}
