//! Order billing
//!
//! [`BillingService::bill_order`] is the administrative entry point: it
//! checks the actor, loads the order, runs the calculator and stores the
//! invoice. An order is billed at most once; the order number doubles as
//! the ledger's idempotency key so a retried or concurrent request cannot
//! charge the patient twice. If the invoice cannot be stored the ledger
//! charge is released, so a failed billing leaves the annual total as it
//! was and the order can be billed again.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use core_kernel::{PortError, UserId};
use domain_orders::{OrderNumber, OrderStore};
use domain_patient::{AccessControl, AccessError, Permission, StaffPort, User};

use crate::calculator::BillingCalculator;
use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::ports::InvoiceStore;

/// Bills orders and issues invoices
pub struct BillingService {
    staff: Arc<dyn StaffPort>,
    orders: Arc<dyn OrderStore>,
    invoices: Arc<dyn InvoiceStore>,
    calculator: Arc<BillingCalculator>,
}

impl BillingService {
    pub fn new(
        staff: Arc<dyn StaffPort>,
        orders: Arc<dyn OrderStore>,
        invoices: Arc<dyn InvoiceStore>,
        calculator: Arc<BillingCalculator>,
    ) -> Self {
        Self {
            staff,
            orders,
            invoices,
            calculator,
        }
    }

    pub fn calculator(&self) -> &Arc<BillingCalculator> {
        &self.calculator
    }

    /// Bills an order on behalf of an administrative user
    #[instrument(skip(self), fields(order_number = %order_number, actor_id = %actor_id))]
    pub async fn bill_order(&self, order_number: OrderNumber, actor_id: UserId) -> Result<Invoice, BillingError> {
        let actor = self.staff.find_user(actor_id).await?;
        Self::ensure_active(&actor, Permission::BILLING_CREATE)?;

        let order = self.orders.find_by_number(order_number).await?;
        if self.invoices.find_by_order(order_number).await?.is_some() {
            return Err(BillingError::AlreadyBilled(order_number.to_string()));
        }

        let billed_on = self.calculator.today();
        let result = self
            .calculator
            .calculate_on(order.patient_id, order.total_cost, billed_on, Some(order_number.to_string()))
            .await
            .map_err(|e| already_billed_on_conflict(e, order_number))?;

        let invoice = Invoice::new(order_number, order.patient_id, actor.id, billed_on, result);
        if let Err(e) = self.invoices.save(&invoice).await {
            self.release_charge(&invoice).await;
            return Err(already_billed_on_conflict(e.into(), order_number));
        }

        info!(
            invoice_number = %invoice.invoice_number,
            branch = %invoice.result.branch,
            copayment = %invoice.result.copayment_charged,
            coverage = %invoice.result.insurance_coverage,
            "order billed"
        );
        Ok(invoice)
    }

    /// The invoice of a billed order
    pub async fn invoice_for(&self, order_number: OrderNumber, actor_id: UserId) -> Result<Invoice, BillingError> {
        let actor = self.staff.find_user(actor_id).await?;
        Self::ensure_active(&actor, Permission::INVOICES_READ)?;

        self.invoices
            .find_by_order(order_number)
            .await?
            .ok_or_else(|| BillingError::not_found("Invoice", order_number))
    }

    /// Ensures `actor` may read copayment totals
    pub async fn authorize_ledger_read(&self, actor_id: UserId) -> Result<(), BillingError> {
        let actor = self.staff.find_user(actor_id).await?;
        Self::ensure_active(&actor, Permission::BILLING_READ)
    }

    async fn release_charge(&self, invoice: &Invoice) {
        let reference = invoice.order_number.to_string();
        match self.calculator.release(invoice.patient_id, &invoice.result, &reference).await {
            Ok(()) => warn!(order_number = %reference, "invoice not stored, billing rolled back"),
            Err(e) => error!(
                order_number = %reference,
                error = %e,
                "invoice not stored and copayment charge could not be released"
            ),
        }
    }

    fn ensure_active(actor: &User, permission: Permission) -> Result<(), BillingError> {
        if !actor.active {
            return Err(AccessError::InactiveUser(actor.username.clone()).into());
        }
        AccessControl::ensure(actor.role, permission)?;
        Ok(())
    }
}

fn already_billed_on_conflict(error: BillingError, order_number: OrderNumber) -> BillingError {
    match error {
        BillingError::Port(PortError::Conflict { .. }) => BillingError::AlreadyBilled(order_number.to_string()),
        other => other,
    }
}
