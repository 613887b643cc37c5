//! PostgreSQL adapters for patients, staff and medical records

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PatientId, PortError, UserId};
use domain_patient::{MedicalRecordPort, Patient, PatientPort, RecordEntry, StaffPort, User};

use super::check_pool;
use crate::repositories::{MedicalRecordRepository, PatientRepository, StaffRepository};

/// Patient registry backed by the `patients` table
#[derive(Debug, Clone)]
pub struct PostgresPatientAdapter {
    pool: PgPool,
    repository: PatientRepository,
}

impl PostgresPatientAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PatientRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPatientAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPatientAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-patient-adapter").await
    }
}

#[async_trait]
impl PatientPort for PostgresPatientAdapter {
    #[instrument(skip(self), fields(patient_id = %id))]
    async fn find_patient(&self, id: PatientId) -> Result<Patient, PortError> {
        debug!("fetching patient");
        self.repository.get_by_id(id).await.map_err(PortError::from)
    }

    #[instrument(skip(self, patient), fields(patient_id = %patient.id))]
    async fn save_patient(&self, patient: &Patient) -> Result<(), PortError> {
        debug!("saving patient");
        self.repository.upsert(patient).await.map_err(PortError::from)
    }
}

/// Staff directory backed by the `staff_users` table
#[derive(Debug, Clone)]
pub struct PostgresStaffAdapter {
    pool: PgPool,
    repository: StaffRepository,
}

impl PostgresStaffAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: StaffRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresStaffAdapter {}

#[async_trait]
impl HealthCheckable for PostgresStaffAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-staff-adapter").await
    }
}

#[async_trait]
impl StaffPort for PostgresStaffAdapter {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_user(&self, id: UserId) -> Result<User, PortError> {
        debug!("fetching staff user");
        self.repository.get_by_id(id).await.map_err(PortError::from)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save_user(&self, user: &User) -> Result<(), PortError> {
        self.repository.upsert(user).await.map_err(PortError::from)
    }
}

/// Append-only medical record log
#[derive(Debug, Clone)]
pub struct PostgresMedicalRecordAdapter {
    pool: PgPool,
    repository: MedicalRecordRepository,
}

impl PostgresMedicalRecordAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: MedicalRecordRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresMedicalRecordAdapter {}

#[async_trait]
impl HealthCheckable for PostgresMedicalRecordAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-medical-record-adapter").await
    }
}

#[async_trait]
impl MedicalRecordPort for PostgresMedicalRecordAdapter {
    #[instrument(skip(self, entry), fields(patient_id = %entry.patient_id))]
    async fn append_entry(&self, entry: &RecordEntry) -> Result<(), PortError> {
        debug!("appending medical record entry");
        self.repository.append(entry).await.map_err(PortError::from)
    }

    async fn entries_for(&self, patient_id: PatientId) -> Result<Vec<RecordEntry>, PortError> {
        self.repository.for_patient(patient_id).await.map_err(PortError::from)
    }
}
