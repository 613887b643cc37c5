//! Billing DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use core_kernel::Money;
use domain_billing::{BillingBranch, Invoice};

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub invoice_number: String,
    pub order_number: String,
    pub patient_id: Uuid,
    pub issued_on: NaiveDate,
    pub year: i32,
    pub branch: BillingBranch,
    pub total_cost: Decimal,
    pub copayment_charged: Decimal,
    pub insurance_coverage: Decimal,
    pub requires_full_payment: bool,
    pub accumulated_copayment: Option<Decimal>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        let result = invoice.result;
        Self {
            invoice_number: invoice.invoice_number,
            order_number: invoice.order_number.to_string(),
            patient_id: *invoice.patient_id.as_uuid(),
            issued_on: invoice.issued_on,
            year: result.year.value(),
            branch: result.branch,
            total_cost: result.total_cost.amount(),
            copayment_charged: result.copayment_charged.amount(),
            insurance_coverage: result.insurance_coverage.amount(),
            requires_full_payment: result.requires_full_payment,
            accumulated_copayment: result.accumulated_copayment.map(|m| m.amount()),
            currency: result.total_cost.currency().code().to_string(),
            created_at: invoice.created_at,
        }
    }
}

/// Year-to-date copayments of a patient
#[derive(Debug, Serialize)]
pub struct CopaymentStatusResponse {
    pub patient_id: Uuid,
    pub year: i32,
    pub accumulated: Decimal,
    pub remaining: Decimal,
    pub ceiling: Decimal,
    pub currency: String,
}

impl CopaymentStatusResponse {
    pub fn new(patient_id: Uuid, year: i32, accumulated: Money, remaining: Money, ceiling: Money) -> Self {
        Self {
            patient_id,
            year,
            accumulated: accumulated.amount(),
            remaining: remaining.amount(),
            ceiling: ceiling.amount(),
            currency: accumulated.currency().code().to_string(),
        }
    }
}
