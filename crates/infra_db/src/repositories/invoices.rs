//! Invoice repository

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{CalendarYear, InvoiceId, PatientId, UserId};
use domain_billing::{BillingBranch, BillingResult, Invoice};
use domain_orders::OrderNumber;

use super::money;
use crate::error::DatabaseError;

/// Row of `invoices`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub order_number: String,
    pub patient_id: Uuid,
    pub issued_by: Uuid,
    pub issued_on: NaiveDate,
    pub billing_year: i32,
    pub branch: String,
    pub total_cost: Decimal,
    pub copayment_charged: Decimal,
    pub insurance_coverage: Decimal,
    pub requires_full_payment: bool,
    pub accumulated_copayment: Option<Decimal>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

fn branch_from_str(value: &str) -> Result<BillingBranch, DatabaseError> {
    match value {
        "uninsured" => Ok(BillingBranch::Uninsured),
        "ceiling_reached" => Ok(BillingBranch::CeilingReached),
        "ceiling_saturated" => Ok(BillingBranch::CeilingSaturated),
        "standard" => Ok(BillingBranch::Standard),
        other => Err(DatabaseError::corrupt(format!("unknown billing branch '{}'", other))),
    }
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DatabaseError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let currency = row.currency.as_str();
        let result = BillingResult {
            total_cost: money(row.total_cost, currency)?,
            copayment_charged: money(row.copayment_charged, currency)?,
            insurance_coverage: money(row.insurance_coverage, currency)?,
            requires_full_payment: row.requires_full_payment,
            branch: branch_from_str(&row.branch)?,
            year: CalendarYear::new(row.billing_year).map_err(DatabaseError::corrupt)?,
            accumulated_copayment: row
                .accumulated_copayment
                .map(|amount| money(amount, currency))
                .transpose()?,
        };

        Ok(Invoice {
            id: InvoiceId::from_uuid(row.invoice_id),
            invoice_number: row.invoice_number,
            order_number: row.order_number.trim().parse::<OrderNumber>().map_err(DatabaseError::corrupt)?,
            patient_id: PatientId::from_uuid(row.patient_id),
            issued_by: UserId::from_uuid(row.issued_by),
            issued_on: row.issued_on,
            result,
            created_at: row.created_at,
        })
    }
}

const SELECT_INVOICE: &str = r#"
    SELECT invoice_id, invoice_number, order_number, patient_id, issued_by, issued_on,
           billing_year, branch, total_cost, copayment_charged, insurance_coverage,
           requires_full_payment, accumulated_copayment, currency, created_at
    FROM invoices
"#;

/// Repository for invoices
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an invoice; `DuplicateEntry` if the order is already invoiced
    pub async fn insert(&self, invoice: &Invoice) -> Result<(), DatabaseError> {
        let result = &invoice.result;
        sqlx::query(
            r#"
            INSERT INTO invoices (
                invoice_id, invoice_number, order_number, patient_id, issued_by, issued_on,
                billing_year, branch, total_cost, copayment_charged, insurance_coverage,
                requires_full_payment, accumulated_copayment, currency, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.order_number.to_string())
        .bind(invoice.patient_id.as_uuid())
        .bind(invoice.issued_by.as_uuid())
        .bind(invoice.issued_on)
        .bind(result.year.value())
        .bind(result.branch.as_str())
        .bind(result.total_cost.amount())
        .bind(result.copayment_charged.amount())
        .bind(result.insurance_coverage.amount())
        .bind(result.requires_full_payment)
        .bind(result.accumulated_copayment.map(|m| m.amount()))
        .bind(result.total_cost.currency().code())
        .bind(invoice.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_order(&self, order_number: OrderNumber) -> Result<Option<Invoice>, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(&format!("{SELECT_INVOICE} WHERE order_number = $1"))
            .bind(order_number.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Invoice::try_from)
            .transpose()
    }
}
