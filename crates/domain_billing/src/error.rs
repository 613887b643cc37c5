//! Billing domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};
use domain_patient::AccessError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Invalid amount or policy configuration
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unresolvable patient, order or invoice reference
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// The actor may not bill
    #[error("Access denied: {0}")]
    Access(#[from] AccessError),

    /// The order already has an invoice
    #[error("Order {0} has already been billed")]
    AlreadyBilled(String),

    /// Amount arithmetic failed
    #[error("Calculation error: {0}")]
    Calculation(#[from] MoneyError),

    /// A collaborator failed for a reason other than a missing entity
    #[error("Port error: {0}")]
    Port(PortError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        BillingError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<PortError> for BillingError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => BillingError::NotFound { entity: entity_type, id },
            PortError::Validation { message, .. } => BillingError::Validation(message),
            other => BillingError::Port(other),
        }
    }
}
