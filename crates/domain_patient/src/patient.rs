//! Patients and their insurance policy

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::PatientId;
use crate::error::PatientError;

/// An insurance policy held by a patient
///
/// A policy only counts for billing when it is flagged active *and* has not
/// expired on the billing date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    /// Insurer name
    pub company: String,
    /// Policy number assigned by the insurer
    pub policy_number: String,
    /// Whether the insurer reports the policy as in force
    pub active: bool,
    /// Last day of coverage (inclusive)
    pub expiration_date: NaiveDate,
}

impl InsurancePolicy {
    /// Creates an active policy
    pub fn new(
        company: impl Into<String>,
        policy_number: impl Into<String>,
        expiration_date: NaiveDate,
    ) -> Self {
        Self {
            company: company.into(),
            policy_number: policy_number.into(),
            active: true,
            expiration_date,
        }
    }

    /// Marks the policy inactive
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// True when the policy covers services rendered on `date`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active && self.expiration_date >= date
    }
}

/// A registered patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    /// National identity document number
    pub document_number: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// The patient's insurance policy, if any
    pub insurance: Option<InsurancePolicy>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Registers a new uninsured patient
    pub fn new(
        document_number: impl Into<String>,
        full_name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Result<Self, PatientError> {
        let document_number = document_number.into();
        let full_name = full_name.into();

        if document_number.trim().is_empty() {
            return Err(PatientError::invalid("document number is required"));
        }
        if full_name.trim().is_empty() {
            return Err(PatientError::invalid("full name is required"));
        }

        Ok(Self {
            id: PatientId::new_v7(),
            document_number,
            full_name,
            date_of_birth,
            phone: None,
            email: None,
            insurance: None,
            created_at: Utc::now(),
        })
    }

    /// Attaches an insurance policy
    pub fn with_insurance(mut self, policy: InsurancePolicy) -> Self {
        self.insurance = Some(policy);
        self
    }

    /// Replaces the patient's policy
    ///
    /// Fails if the patient already holds a different policy that is still
    /// active on `today`; the old one must be deactivated first.
    pub fn attach_policy(&mut self, policy: InsurancePolicy, today: NaiveDate) -> Result<(), PatientError> {
        if let Some(current) = &self.insurance {
            if current.policy_number != policy.policy_number && current.is_active_on(today) {
                return Err(PatientError::DuplicateActivePolicy(current.policy_number.clone()));
            }
        }
        self.insurance = Some(policy);
        Ok(())
    }

    /// The policy that covers services on `date`, if any
    pub fn active_policy_on(&self, date: NaiveDate) -> Option<&InsurancePolicy> {
        self.insurance.as_ref().filter(|p| p.is_active_on(date))
    }

    /// Age in whole years on `date`
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.date_of_birth).unwrap_or(0)
    }
}
