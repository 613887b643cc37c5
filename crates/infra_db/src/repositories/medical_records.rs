//! Medical record entry repository (append-only)

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{PatientId, RecordEntryId, UserId};
use domain_patient::RecordEntry;

use crate::error::DatabaseError;

/// Row of `medical_record_entries`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordEntryRow {
    pub entry_id: Uuid,
    pub patient_id: Uuid,
    pub recorded_on: NaiveDate,
    pub author_id: Uuid,
    pub summary: String,
    pub order_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RecordEntryRow> for RecordEntry {
    fn from(row: RecordEntryRow) -> Self {
        RecordEntry {
            id: RecordEntryId::from_uuid(row.entry_id),
            patient_id: PatientId::from_uuid(row.patient_id),
            recorded_on: row.recorded_on,
            author_id: UserId::from_uuid(row.author_id),
            summary: row.summary,
            order_number: row.order_number.map(|n| n.trim().to_string()),
            created_at: row.created_at,
        }
    }
}

/// Repository for medical record entries
#[derive(Debug, Clone)]
pub struct MedicalRecordRepository {
    pool: PgPool,
}

impl MedicalRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &RecordEntry) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        insert_entry(&mut conn, entry).await
    }

    pub async fn for_patient(&self, patient_id: PatientId) -> Result<Vec<RecordEntry>, DatabaseError> {
        let rows = sqlx::query_as::<_, RecordEntryRow>(
            r#"
            SELECT entry_id, patient_id, recorded_on, author_id, summary, order_number, created_at
            FROM medical_record_entries
            WHERE patient_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(patient_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RecordEntry::from).collect())
    }
}

/// Inserts an entry on a caller-supplied connection or transaction
pub(crate) async fn insert_entry(conn: &mut PgConnection, entry: &RecordEntry) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO medical_record_entries (
            entry_id, patient_id, recorded_on, author_id, summary, order_number, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.patient_id.as_uuid())
    .bind(entry.recorded_on)
    .bind(entry.author_id.as_uuid())
    .bind(&entry.summary)
    .bind(&entry.order_number)
    .bind(entry.created_at)
    .execute(conn)
    .await?;
    Ok(())
}
