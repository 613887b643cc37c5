//! Medical record entries
//!
//! A patient's medical record is an append-only sequence of dated entries.
//! Entries are never edited; corrections are new entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{PatientId, RecordEntryId, UserId};
use crate::error::PatientError;

/// One dated entry in a patient's medical record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub id: RecordEntryId,
    pub patient_id: PatientId,
    /// Clinical date the entry refers to
    pub recorded_on: NaiveDate,
    pub author_id: UserId,
    pub summary: String,
    /// Order that produced this entry, if any
    pub order_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecordEntry {
    pub fn new(
        patient_id: PatientId,
        author_id: UserId,
        recorded_on: NaiveDate,
        summary: impl Into<String>,
    ) -> Result<Self, PatientError> {
        let summary = summary.into();
        if summary.trim().is_empty() {
            return Err(PatientError::InvalidEntry("summary must not be empty".to_string()));
        }

        Ok(Self {
            id: RecordEntryId::new_v7(),
            patient_id,
            recorded_on,
            author_id,
            summary,
            order_number: None,
            created_at: Utc::now(),
        })
    }

    /// Links the entry to the order that produced it
    pub fn for_order(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = Some(order_number.into());
        self
    }
}
