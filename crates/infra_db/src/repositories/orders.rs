//! Medical order repository
//!
//! Order lines are stored as JSONB arrays on the order row. The primary key
//! on `order_number` rejects a second insert of the same number with SQLSTATE
//! 23505, which surfaces as [`DatabaseError::DuplicateEntry`].
//!
//! An order and its medical record entry are written in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{PatientId, UserId};
use domain_orders::{DiagnosticLine, MedicationLine, Order, OrderCategory, OrderNumber, ProcedureLine};
use domain_patient::RecordEntry;

use super::medical_records::insert_entry;
use super::money;
use crate::error::DatabaseError;

/// Row of `medical_orders`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub order_number: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub created_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub diagnosis: Option<String>,
    pub category: String,
    pub medications: Json<Vec<MedicationLine>>,
    pub procedures: Json<Vec<ProcedureLine>>,
    pub diagnostics: Json<Vec<DiagnosticLine>>,
    pub total_cost: Decimal,
    pub currency: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = DatabaseError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let category = match row.category.as_str() {
            "diagnostic" => OrderCategory::Diagnostic,
            "treatment" => OrderCategory::Treatment,
            other => return Err(DatabaseError::corrupt(format!("unknown order category '{}'", other))),
        };

        Ok(Order {
            number: row.order_number.trim().parse().map_err(DatabaseError::corrupt)?,
            patient_id: PatientId::from_uuid(row.patient_id),
            doctor_id: UserId::from_uuid(row.doctor_id),
            created_on: row.created_on,
            created_at: row.created_at,
            diagnosis: row.diagnosis,
            category,
            medications: row.medications.0,
            procedures: row.procedures.0,
            diagnostics: row.diagnostics.0,
            total_cost: money(row.total_cost, &row.currency)?,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT order_number, patient_id, doctor_id, created_on, created_at, diagnosis,
           category, medications, procedures, diagnostics, total_cost, currency
    FROM medical_orders
"#;

/// Repository for medical orders
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, number: OrderNumber) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM medical_orders WHERE order_number = $1)",
        )
        .bind(number.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Inserts an order; fails with `DuplicateEntry` if the number is taken
    pub async fn insert(&self, order: &Order) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        insert_order(&mut conn, order).await
    }

    /// Inserts an order and its medical record entry; commits both or neither
    pub async fn insert_with_record(&self, order: &Order, entry: &RecordEntry) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_order(&mut tx, order).await?;
        insert_entry(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_number(&self, number: OrderNumber) -> Result<Order, DatabaseError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE order_number = $1"))
            .bind(number.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Order", number))?;
        row.try_into()
    }

    pub async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, DatabaseError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE patient_id = $1 ORDER BY created_at, order_number"
        ))
        .bind(patient_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    pub async fn count(&self) -> Result<u64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM medical_orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

async fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO medical_orders (
            order_number, patient_id, doctor_id, created_on, created_at, diagnosis,
            category, medications, procedures, diagnostics, total_cost, currency
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(order.number.to_string())
    .bind(order.patient_id.as_uuid())
    .bind(order.doctor_id.as_uuid())
    .bind(order.created_on)
    .bind(order.created_at)
    .bind(&order.diagnosis)
    .bind(order.category.as_str())
    .bind(Json(&order.medications))
    .bind(Json(&order.procedures))
    .bind(Json(&order.diagnostics))
    .bind(order.total_cost.amount())
    .bind(order.total_cost.currency().code())
    .execute(conn)
    .await?;
    Ok(())
}
