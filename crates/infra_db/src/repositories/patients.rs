//! Patient repository
//!
//! The single insurance policy lives in nullable columns on the patient row;
//! either all four policy columns are set or none are.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::PatientId;
use domain_patient::{InsurancePolicy, Patient};

use crate::error::DatabaseError;

/// Row of `patients`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PatientRow {
    pub patient_id: Uuid,
    pub document_number: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub insurance_company: Option<String>,
    pub policy_number: Option<String>,
    pub policy_active: Option<bool>,
    pub policy_expiration: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        let insurance = match (row.insurance_company, row.policy_number, row.policy_active, row.policy_expiration) {
            (Some(company), Some(policy_number), Some(active), Some(expiration_date)) => Some(InsurancePolicy {
                company,
                policy_number,
                active,
                expiration_date,
            }),
            _ => None,
        };

        Patient {
            id: PatientId::from_uuid(row.patient_id),
            document_number: row.document_number,
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            phone: row.phone,
            email: row.email,
            insurance,
            created_at: row.created_at,
        }
    }
}

/// Repository for patients
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: PatientId) -> Result<Patient, DatabaseError> {
        let row = sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT patient_id, document_number, full_name, date_of_birth, phone, email,
                   insurance_company, policy_number, policy_active, policy_expiration, created_at
            FROM patients
            WHERE patient_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Patient", id))?;
        Ok(row.into())
    }

    pub async fn upsert(&self, patient: &Patient) -> Result<(), DatabaseError> {
        let policy = patient.insurance.as_ref();
        sqlx::query(
            r#"
            INSERT INTO patients (
                patient_id, document_number, full_name, date_of_birth, phone, email,
                insurance_company, policy_number, policy_active, policy_expiration, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (patient_id) DO UPDATE SET
                document_number = EXCLUDED.document_number,
                full_name = EXCLUDED.full_name,
                date_of_birth = EXCLUDED.date_of_birth,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                insurance_company = EXCLUDED.insurance_company,
                policy_number = EXCLUDED.policy_number,
                policy_active = EXCLUDED.policy_active,
                policy_expiration = EXCLUDED.policy_expiration
            "#,
        )
        .bind(patient.id.as_uuid())
        .bind(&patient.document_number)
        .bind(&patient.full_name)
        .bind(patient.date_of_birth)
        .bind(&patient.phone)
        .bind(&patient.email)
        .bind(policy.map(|p| p.company.clone()))
        .bind(policy.map(|p| p.policy_number.clone()))
        .bind(policy.map(|p| p.active))
        .bind(policy.map(|p| p.expiration_date))
        .bind(patient.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
