//! Invoices
//!
//! One invoice per billed order, carrying the copayment/coverage split that
//! was computed when the order was billed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, Money, PatientId, UserId};
use domain_orders::OrderNumber;

use crate::calculator::BillingResult;

/// A billed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Human-readable invoice number, derived from the order number
    pub invoice_number: String,
    pub order_number: OrderNumber,
    pub patient_id: PatientId,
    /// Administrative user who issued the bill
    pub issued_by: UserId,
    pub issued_on: NaiveDate,
    pub result: BillingResult,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        order_number: OrderNumber,
        patient_id: PatientId,
        issued_by: UserId,
        issued_on: NaiveDate,
        result: BillingResult,
    ) -> Self {
        Self {
            id: InvoiceId::new_v7(),
            invoice_number: format!("INV-{}-{}", result.year, order_number),
            order_number,
            patient_id,
            issued_by,
            issued_on,
            result,
            created_at: Utc::now(),
        }
    }

    /// Amount the patient must pay at the counter
    pub fn patient_due(&self) -> Money {
        self.result.copayment_charged
    }

    /// Amount to be claimed from the insurer
    pub fn insurer_due(&self) -> Money {
        self.result.insurance_coverage
    }
}
