//! Copayment policy
//!
//! The annual ceiling and the standard per-service copayment are business
//! configuration. Defaults follow the hospital's current tariff:
//! 1,000,000 COP per year and 50,000 COP per billed order.

use serde::Serialize;

use core_kernel::{Currency, Money, MoneyError};

use crate::error::BillingError;

/// Ceiling and standard copayment, in one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingPolicy {
    max_annual_copayment: Money,
    standard_copayment: Money,
}

impl BillingPolicy {
    /// Default annual ceiling in COP
    pub const DEFAULT_MAX_ANNUAL_COPAYMENT: i64 = 1_000_000;
    /// Default standard copayment in COP
    pub const DEFAULT_STANDARD_COPAYMENT: i64 = 50_000;

    /// Creates a validated policy
    ///
    /// Both amounts must be positive and share a currency, and the standard
    /// copayment may not exceed the ceiling.
    pub fn new(max_annual_copayment: Money, standard_copayment: Money) -> Result<Self, BillingError> {
        if !max_annual_copayment.is_positive() || !standard_copayment.is_positive() {
            return Err(BillingError::validation("copayment amounts must be positive"));
        }
        if standard_copayment.checked_cmp(&max_annual_copayment)?.is_gt() {
            return Err(BillingError::validation(format!(
                "standard copayment {} exceeds annual ceiling {}",
                standard_copayment, max_annual_copayment
            )));
        }
        Ok(Self {
            max_annual_copayment,
            standard_copayment,
        })
    }

    pub fn max_annual_copayment(&self) -> Money {
        self.max_annual_copayment
    }

    pub fn standard_copayment(&self) -> Money {
        self.standard_copayment
    }

    pub fn currency(&self) -> Currency {
        self.max_annual_copayment.currency()
    }

    /// Copayment to request for a service before the ceiling is applied
    ///
    /// A service cheaper than the standard copayment is charged in full,
    /// never more.
    pub fn requested_copayment(&self, total_cost: Money) -> Result<Money, MoneyError> {
        self.standard_copayment.checked_min(&total_cost)
    }

    /// Headroom left under the ceiling
    pub fn remaining(&self, accumulated: Money) -> Result<Money, MoneyError> {
        self.max_annual_copayment.saturating_sub(&accumulated)
    }

    /// Copayment due given what has already been charged this year
    ///
    /// `min(standard, total_cost, ceiling - accumulated)`, floored at zero.
    pub fn copayment_for(&self, total_cost: Money, accumulated: Money) -> Result<Money, MoneyError> {
        self.requested_copayment(total_cost)?
            .checked_min(&self.remaining(accumulated)?)
    }
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            max_annual_copayment: Money::from_units(Self::DEFAULT_MAX_ANNUAL_COPAYMENT, Currency::COP),
            standard_copayment: Money::from_units(Self::DEFAULT_STANDARD_COPAYMENT, Currency::COP),
        }
    }
}
