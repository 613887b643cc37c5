//! Patient domain errors

use thiserror::Error;

/// Errors raised while building or validating patient-side records
#[derive(Debug, Error)]
pub enum PatientError {
    /// Invalid patient data provided
    #[error("Invalid patient data: {0}")]
    InvalidData(String),

    /// A second active policy was attached to a patient
    #[error("Patient already holds an active insurance policy: {0}")]
    DuplicateActivePolicy(String),

    /// Invalid record entry
    #[error("Invalid medical record entry: {0}")]
    InvalidEntry(String),
}

impl PatientError {
    /// Creates an InvalidData error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        PatientError::InvalidData(message.into())
    }
}
