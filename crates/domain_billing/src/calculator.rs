//! Copayment and coverage calculation
//!
//! Three branches, checked in order:
//!
//! 1. **Uninsured** (no policy, inactive, or expired on the billing date):
//!    the patient pays the full cost; the ledger is not touched
//! 2. **Ceiling reached** (the year's total is already at the ceiling):
//!    copayment is zero and insurance covers everything
//! 3. **Below the ceiling**: the standard copayment is charged, or only
//!    the remaining headroom when that is smaller, and the ledger grows by
//!    the amount charged
//!
//! Branches 2 and 3 are decided inside a single atomic ledger operation,
//! so the ceiling holds under concurrent billing of the same patient.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{CalendarYear, Money, PatientId, SharedClock, Timezone};
use domain_patient::PatientPort;

use crate::error::BillingError;
use crate::ledger::{CappedCharge, CopaymentLedger, LedgerCharge};
use crate::policy::BillingPolicy;

/// Which rule decided a billing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingBranch {
    /// No active insurance; full payment
    Uninsured,
    /// Annual ceiling was already reached; no copayment
    CeilingReached,
    /// Charge was cut to the remaining headroom, which is now zero
    CeilingSaturated,
    /// Standard copayment (or the whole cost, if cheaper)
    Standard,
}

impl BillingBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingBranch::Uninsured => "uninsured",
            BillingBranch::CeilingReached => "ceiling_reached",
            BillingBranch::CeilingSaturated => "ceiling_saturated",
            BillingBranch::Standard => "standard",
        }
    }

    fn of(charge: &LedgerCharge, requested: Money, ceiling: Money) -> Self {
        if charge.accumulated_before >= ceiling {
            BillingBranch::CeilingReached
        } else if charge.charged < requested {
            BillingBranch::CeilingSaturated
        } else {
            BillingBranch::Standard
        }
    }
}

impl fmt::Display for BillingBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a service's cost is split between patient and insurer
///
/// `copayment_charged + insurance_coverage == total_cost` on every branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingResult {
    pub total_cost: Money,
    pub copayment_charged: Money,
    pub insurance_coverage: Money,
    pub requires_full_payment: bool,
    pub branch: BillingBranch,
    /// Calendar year the copayment counts toward
    pub year: CalendarYear,
    /// Year-to-date copayments after this billing; `None` when uninsured
    pub accumulated_copayment: Option<Money>,
}

impl BillingResult {
    fn uninsured(total_cost: Money, year: CalendarYear) -> Self {
        Self {
            total_cost,
            copayment_charged: total_cost,
            insurance_coverage: Money::zero(total_cost.currency()),
            requires_full_payment: true,
            branch: BillingBranch::Uninsured,
            year,
            accumulated_copayment: None,
        }
    }

    fn insured(total_cost: Money, charge: LedgerCharge, branch: BillingBranch, year: CalendarYear) -> Result<Self, BillingError> {
        Ok(Self {
            total_cost,
            copayment_charged: charge.charged,
            insurance_coverage: total_cost.checked_sub(&charge.charged)?,
            requires_full_payment: false,
            branch,
            year,
            accumulated_copayment: Some(charge.accumulated_after),
        })
    }
}

/// Computes patient responsibility and records copayments in the ledger
pub struct BillingCalculator {
    patients: Arc<dyn PatientPort>,
    ledger: Arc<dyn CopaymentLedger>,
    policy: BillingPolicy,
    clock: SharedClock,
    timezone: Timezone,
}

impl BillingCalculator {
    pub fn new(
        patients: Arc<dyn PatientPort>,
        ledger: Arc<dyn CopaymentLedger>,
        policy: BillingPolicy,
        clock: SharedClock,
        timezone: Timezone,
    ) -> Self {
        Self {
            patients,
            ledger,
            policy,
            clock,
            timezone,
        }
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    /// Today's date in the hospital's timezone
    pub fn today(&self) -> NaiveDate {
        self.clock.today_in(&self.timezone)
    }

    /// Bills a service rendered today
    pub async fn calculate(&self, patient_id: PatientId, total_cost: Money) -> Result<BillingResult, BillingError> {
        self.calculate_on(patient_id, total_cost, self.today(), None).await
    }

    /// Bills a service on a given date
    ///
    /// `reference` makes the ledger charge idempotent: a second call with
    /// the same reference fails with a port conflict instead of charging
    /// twice.
    #[instrument(skip(self, reference), fields(patient_id = %patient_id, total_cost = %total_cost))]
    pub async fn calculate_on(
        &self,
        patient_id: PatientId,
        total_cost: Money,
        billed_on: NaiveDate,
        reference: Option<String>,
    ) -> Result<BillingResult, BillingError> {
        self.validate_cost(total_cost)?;

        let patient = self.patients.find_patient(patient_id).await?;
        let year = CalendarYear::of(billed_on);

        if patient.active_policy_on(billed_on).is_none() {
            debug!(%year, "no active insurance, full payment required");
            return Ok(BillingResult::uninsured(total_cost, year));
        }

        let requested = self.policy.requested_copayment(total_cost)?;
        let ceiling = self.policy.max_annual_copayment();
        let charge = self
            .ledger
            .charge_capped(&CappedCharge {
                patient_id,
                year,
                requested,
                ceiling,
                reference,
            })
            .await?;

        let branch = BillingBranch::of(&charge, requested, ceiling);
        match branch {
            BillingBranch::CeilingSaturated => warn!(
                %year,
                copayment = %charge.charged,
                "annual copayment ceiling reached with this billing"
            ),
            _ => info!(
                %year,
                %branch,
                copayment = %charge.charged,
                accumulated = %charge.accumulated_after,
                "copayment charged"
            ),
        }

        BillingResult::insured(total_cost, charge, branch, year)
    }

    /// Takes back the ledger charge a billing made under `reference`
    ///
    /// Uninsured results never touched the ledger, so there is nothing to
    /// release for them.
    #[instrument(skip(self, result), fields(patient_id = %patient_id, branch = %result.branch))]
    pub async fn release(
        &self,
        patient_id: PatientId,
        result: &BillingResult,
        reference: &str,
    ) -> Result<(), BillingError> {
        if result.branch == BillingBranch::Uninsured {
            return Ok(());
        }
        let accumulated = self.ledger.release_charge(patient_id, result.year, reference).await?;
        info!(
            year = %result.year,
            released = %result.copayment_charged,
            %accumulated,
            "copayment charge released"
        );
        Ok(())
    }

    /// Year-to-date copayments and remaining headroom for a patient
    pub async fn annual_status(
        &self,
        patient_id: PatientId,
        year: CalendarYear,
    ) -> Result<(Money, Money), BillingError> {
        self.patients.find_patient(patient_id).await?;
        let accumulated = self.ledger.get_accumulated(patient_id, year).await?;
        let remaining = self.policy.remaining(accumulated)?;
        Ok((accumulated, remaining))
    }

    fn validate_cost(&self, total_cost: Money) -> Result<(), BillingError> {
        if total_cost.is_negative() {
            return Err(BillingError::validation("total cost cannot be negative"));
        }
        if total_cost.currency() != self.policy.currency() {
            return Err(BillingError::validation(format!(
                "total cost is in {}, billing policy is in {}",
                total_cost.currency(),
                self.policy.currency()
            )));
        }
        Ok(())
    }
}
