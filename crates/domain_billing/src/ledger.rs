//! Annual copayment ledger
//!
//! A running sum of copayments per `(patient, calendar year)`. A new year is
//! a new key, so totals roll over without any reset operation.
//!
//! # Invariants
//!
//! - The accumulated amount for a key is never negative. It only decreases
//!   when [`CopaymentLedger::release_charge`] takes back a referenced charge
//!   whose billing could not be completed
//! - [`CopaymentLedger::charge_capped`] reads, caps and adds as one atomic
//!   step per key, so concurrent billings of the same patient can never
//!   jointly overshoot the ceiling
//! - Different keys never contend with each other

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{CalendarYear, DomainPort, Money, PatientId, PortError};

/// A request to charge up to `requested`, without taking the year's total
/// above `ceiling`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CappedCharge {
    pub patient_id: PatientId,
    pub year: CalendarYear,
    pub requested: Money,
    pub ceiling: Money,
    /// Idempotency key (the order number); a second charge with the same
    /// reference fails with `PortError::Conflict`
    pub reference: Option<String>,
}

/// Outcome of a capped charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCharge {
    pub accumulated_before: Money,
    pub charged: Money,
    pub accumulated_after: Money,
}

impl CappedCharge {
    /// Applies the cap to an accumulated total
    ///
    /// Adapters call this inside their critical section.
    pub fn settle(&self, accumulated_before: Money) -> Result<LedgerCharge, PortError> {
        if self.requested.is_negative() {
            return Err(PortError::validation_field("copayment charge cannot be negative", "requested"));
        }
        let remaining = self
            .ceiling
            .saturating_sub(&accumulated_before)
            .map_err(|e| PortError::validation(e.to_string()))?;
        let charged = self
            .requested
            .checked_min(&remaining)
            .map_err(|e| PortError::validation(e.to_string()))?;
        let accumulated_after = accumulated_before
            .checked_add(&charged)
            .map_err(|e| PortError::validation(e.to_string()))?;

        Ok(LedgerCharge {
            accumulated_before,
            charged,
            accumulated_after,
        })
    }
}

/// Copayment accumulator store
#[async_trait]
pub trait CopaymentLedger: DomainPort {
    /// Total charged to the patient in `year`; zero if nothing was charged
    async fn get_accumulated(&self, patient_id: PatientId, year: CalendarYear) -> Result<Money, PortError>;

    /// Adds an uncapped, non-negative charge and returns the new total
    async fn add_charge(
        &self,
        patient_id: PatientId,
        year: CalendarYear,
        amount: Money,
    ) -> Result<Money, PortError>;

    /// Atomically reads the total, caps the charge at the ceiling and adds it
    async fn charge_capped(&self, charge: &CappedCharge) -> Result<LedgerCharge, PortError>;

    /// Takes back the capped charge recorded under `reference` and frees the
    /// reference; returns the new total
    ///
    /// `PortError::NotFound` if no charge of that key carries the reference.
    async fn release_charge(
        &self,
        patient_id: PatientId,
        year: CalendarYear,
        reference: &str,
    ) -> Result<Money, PortError>;
}

/// In-memory implementation for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::Currency;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{Mutex, RwLock};

    type Key = (PatientId, CalendarYear);

    #[derive(Debug)]
    struct Account {
        accumulated: Money,
        /// Amount charged under each reference
        references: HashMap<String, Money>,
    }

    /// In-memory ledger with one async mutex per `(patient, year)` key
    #[derive(Debug)]
    pub struct MockCopaymentLedger {
        currency: Currency,
        accounts: RwLock<HashMap<Key, Arc<Mutex<Account>>>>,
    }

    impl MockCopaymentLedger {
        pub fn new(currency: Currency) -> Self {
            Self {
                currency,
                accounts: RwLock::new(HashMap::new()),
            }
        }

        /// Starts a key at a given total
        pub async fn with_accumulated(self, patient_id: PatientId, year: CalendarYear, amount: Money) -> Self {
            let account = self.account(patient_id, year).await;
            account.lock().await.accumulated = amount;
            self
        }

        async fn account(&self, patient_id: PatientId, year: CalendarYear) -> Arc<Mutex<Account>> {
            let key = (patient_id, year);
            if let Some(account) = self.accounts.read().await.get(&key) {
                return account.clone();
            }
            self.accounts
                .write()
                .await
                .entry(key)
                .or_insert_with(|| {
                    Arc::new(Mutex::new(Account {
                        accumulated: Money::zero(self.currency),
                        references: HashMap::new(),
                    }))
                })
                .clone()
        }
    }

    impl Default for MockCopaymentLedger {
        fn default() -> Self {
            Self::new(Currency::COP)
        }
    }

    impl DomainPort for MockCopaymentLedger {}

    #[async_trait]
    impl CopaymentLedger for MockCopaymentLedger {
        async fn get_accumulated(&self, patient_id: PatientId, year: CalendarYear) -> Result<Money, PortError> {
            match self.accounts.read().await.get(&(patient_id, year)) {
                Some(account) => Ok(account.lock().await.accumulated),
                None => Ok(Money::zero(self.currency)),
            }
        }

        async fn add_charge(
            &self,
            patient_id: PatientId,
            year: CalendarYear,
            amount: Money,
        ) -> Result<Money, PortError> {
            if amount.is_negative() {
                return Err(PortError::validation_field("copayment charge cannot be negative", "amount"));
            }
            let account = self.account(patient_id, year).await;
            let mut account = account.lock().await;
            account.accumulated = account
                .accumulated
                .checked_add(&amount)
                .map_err(|e| PortError::validation(e.to_string()))?;
            Ok(account.accumulated)
        }

        async fn charge_capped(&self, charge: &CappedCharge) -> Result<LedgerCharge, PortError> {
            let account = self.account(charge.patient_id, charge.year).await;
            let mut account = account.lock().await;

            if let Some(reference) = &charge.reference {
                if account.references.contains_key(reference) {
                    return Err(PortError::conflict(format!("charge {} already recorded", reference)));
                }
            }

            let outcome = charge.settle(account.accumulated)?;
            account.accumulated = outcome.accumulated_after;
            if let Some(reference) = &charge.reference {
                account.references.insert(reference.clone(), outcome.charged);
            }
            Ok(outcome)
        }

        async fn release_charge(
            &self,
            patient_id: PatientId,
            year: CalendarYear,
            reference: &str,
        ) -> Result<Money, PortError> {
            let account = self.account(patient_id, year).await;
            let mut account = account.lock().await;

            let charged = account
                .references
                .remove(reference)
                .ok_or_else(|| PortError::not_found("Copayment charge", reference))?;
            account.accumulated = account
                .accumulated
                .saturating_sub(&charged)
                .map_err(|e| PortError::validation(e.to_string()))?;
            Ok(account.accumulated)
        }
    }
}
