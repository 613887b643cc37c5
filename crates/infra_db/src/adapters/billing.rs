//! PostgreSQL adapters for the billing domain

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    CalendarYear, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money, PatientId,
    PortError,
};
use domain_billing::{CappedCharge, CopaymentLedger, Invoice, InvoiceStore, LedgerCharge};
use domain_orders::OrderNumber;

use super::check_pool;
use crate::repositories::{CopaymentRepository, InvoiceRepository};

/// Annual copayment ledger backed by `annual_copayments`
///
/// Capped charges lock the `(patient, year)` row for the duration of the
/// read-cap-write transaction.
#[derive(Debug, Clone)]
pub struct PostgresCopaymentLedger {
    pool: PgPool,
    repository: CopaymentRepository,
}

impl PostgresCopaymentLedger {
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self {
            repository: CopaymentRepository::new(pool.clone(), currency),
            pool,
        }
    }
}

impl DomainPort for PostgresCopaymentLedger {}

#[async_trait]
impl HealthCheckable for PostgresCopaymentLedger {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-copayment-ledger").await
    }
}

#[async_trait]
impl CopaymentLedger for PostgresCopaymentLedger {
    async fn get_accumulated(&self, patient_id: PatientId, year: CalendarYear) -> Result<Money, PortError> {
        self.repository
            .get_accumulated(patient_id, year)
            .await
            .map_err(PortError::from)
    }

    #[instrument(skip(self), fields(patient_id = %patient_id, year = year.value()))]
    async fn add_charge(
        &self,
        patient_id: PatientId,
        year: CalendarYear,
        amount: Money,
    ) -> Result<Money, PortError> {
        if amount.is_negative() {
            return Err(PortError::validation_field("charge must not be negative", "amount"));
        }
        self.repository
            .add_charge(patient_id, year, amount)
            .await
            .map_err(PortError::from)
    }

    #[instrument(skip(self, charge), fields(patient_id = %charge.patient_id, year = charge.year.value()))]
    async fn charge_capped(&self, charge: &CappedCharge) -> Result<LedgerCharge, PortError> {
        debug!(requested = %charge.requested, "charging copayment");
        self.repository.charge_capped(charge).await.map_err(PortError::from)
    }

    #[instrument(skip(self), fields(patient_id = %patient_id, year = year.value()))]
    async fn release_charge(
        &self,
        patient_id: PatientId,
        year: CalendarYear,
        reference: &str,
    ) -> Result<Money, PortError> {
        debug!("releasing copayment charge");
        self.repository
            .release_charge(patient_id, year, reference)
            .await
            .map_err(PortError::from)
    }
}

/// Invoice persistence backed by `invoices`
#[derive(Debug, Clone)]
pub struct PostgresInvoiceStore {
    pool: PgPool,
    repository: InvoiceRepository,
}

impl PostgresInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InvoiceRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresInvoiceStore {}

#[async_trait]
impl HealthCheckable for PostgresInvoiceStore {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-invoice-store").await
    }
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.invoice_number))]
    async fn save(&self, invoice: &Invoice) -> Result<(), PortError> {
        debug!("saving invoice");
        self.repository.insert(invoice).await.map_err(PortError::from)
    }

    async fn find_by_order(&self, order_number: OrderNumber) -> Result<Option<Invoice>, PortError> {
        self.repository.find_by_order(order_number).await.map_err(PortError::from)
    }
}
