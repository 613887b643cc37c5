//! Order domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};
use domain_patient::AccessError;

/// Errors that can occur while creating or reading orders
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed or contradictory order contents
    #[error("Validation error: {0}")]
    Validation(String),

    /// An unresolvable patient, doctor, catalog item or order reference
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// Every number in the order-number space is taken
    #[error("Order number space exhausted ({capacity} numbers in use)")]
    NumberSpaceExhausted {
        capacity: u32,
    },

    /// The actor may not perform this operation
    #[error("Access denied: {0}")]
    Access(#[from] AccessError),

    /// Cost arithmetic failed (overflow or mixed currencies)
    #[error("Cost calculation error: {0}")]
    Calculation(#[from] MoneyError),

    /// A collaborator failed for a reason other than a missing entity
    #[error("Port error: {0}")]
    Port(PortError),
}

impl OrderError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        OrderError::Validation(message.into())
    }

    /// Creates a not found error
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        OrderError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Fatal errors must not be retried by callers
    pub fn is_fatal(&self) -> bool {
        matches!(self, OrderError::NumberSpaceExhausted { .. })
    }
}

impl From<PortError> for OrderError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => OrderError::NotFound { entity: entity_type, id },
            PortError::Validation { message, .. } => OrderError::Validation(message),
            other => OrderError::Port(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_maps_to_not_found() {
        let error: OrderError = PortError::not_found("Patient", "PAT-1").into();
        assert!(matches!(error, OrderError::NotFound { ref entity, .. } if entity == "Patient"));
    }

    #[test]
    fn test_port_conflict_stays_port_error() {
        let error: OrderError = PortError::conflict("duplicate").into();
        assert!(matches!(error, OrderError::Port(PortError::Conflict { .. })));
    }

    #[test]
    fn test_only_exhaustion_is_fatal() {
        assert!(OrderError::NumberSpaceExhausted { capacity: 10 }.is_fatal());
        assert!(!OrderError::validation("x").is_fatal());
    }
}
