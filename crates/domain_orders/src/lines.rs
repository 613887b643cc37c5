//! Order line items
//!
//! Requests arrive as [`OrderLineRequest`]s carrying only an item reference
//! and clinical details. Once the unit cost has been read from the catalog
//! they become priced lines: [`MedicationLine`], [`ProcedureLine`] or
//! [`DiagnosticLine`].

use serde::{Deserialize, Serialize};

use core_kernel::{InventoryItemId, Money, MoneyError};

use crate::catalog::CatalogKind;
use crate::error::OrderError;

/// Behaviour shared by all priced lines
pub trait OrderLine {
    fn line_number(&self) -> u32;
    fn item_id(&self) -> InventoryItemId;
    fn quantity(&self) -> u32;
    fn unit_cost(&self) -> Money;

    /// `unit_cost × quantity`
    fn line_total(&self) -> Result<Money, MoneyError> {
        self.unit_cost().checked_mul_quantity(self.quantity())
    }
}

/// A prescribed medication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationLine {
    pub line_number: u32,
    pub item_id: InventoryItemId,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: u32,
    pub quantity: u32,
    pub unit_cost: Money,
}

/// A procedure to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureLine {
    pub line_number: u32,
    pub item_id: InventoryItemId,
    pub quantity: u32,
    pub frequency: Option<String>,
    pub requires_specialist: bool,
    pub specialist_type: Option<String>,
    pub unit_cost: Money,
}

/// A diagnostic study (lab test, imaging)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticLine {
    pub line_number: u32,
    pub item_id: InventoryItemId,
    pub quantity: u32,
    pub requires_specialist: bool,
    pub specialist_type: Option<String>,
    pub unit_cost: Money,
}

macro_rules! impl_order_line {
    ($($line:ty),*) => {
        $(
            impl OrderLine for $line {
                fn line_number(&self) -> u32 { self.line_number }
                fn item_id(&self) -> InventoryItemId { self.item_id }
                fn quantity(&self) -> u32 { self.quantity }
                fn unit_cost(&self) -> Money { self.unit_cost }
            }
        )*
    };
}

impl_order_line!(MedicationLine, ProcedureLine, DiagnosticLine);

/// An unpriced line as submitted by the ordering doctor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderLineRequest {
    Medication {
        item_id: InventoryItemId,
        dosage: String,
        frequency: String,
        duration_days: u32,
        quantity: u32,
    },
    Procedure {
        item_id: InventoryItemId,
        quantity: u32,
        #[serde(default)]
        frequency: Option<String>,
        #[serde(default)]
        requires_specialist: bool,
        #[serde(default)]
        specialist_type: Option<String>,
    },
    Diagnostic {
        item_id: InventoryItemId,
        quantity: u32,
        #[serde(default)]
        requires_specialist: bool,
        #[serde(default)]
        specialist_type: Option<String>,
    },
}

impl OrderLineRequest {
    pub fn medication(
        item_id: InventoryItemId,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
        duration_days: u32,
        quantity: u32,
    ) -> Self {
        OrderLineRequest::Medication {
            item_id,
            dosage: dosage.into(),
            frequency: frequency.into(),
            duration_days,
            quantity,
        }
    }

    pub fn procedure(item_id: InventoryItemId, quantity: u32) -> Self {
        OrderLineRequest::Procedure {
            item_id,
            quantity,
            frequency: None,
            requires_specialist: false,
            specialist_type: None,
        }
    }

    pub fn diagnostic(item_id: InventoryItemId, quantity: u32) -> Self {
        OrderLineRequest::Diagnostic {
            item_id,
            quantity,
            requires_specialist: false,
            specialist_type: None,
        }
    }

    /// Marks a procedure or diagnostic line as needing a specialist
    pub fn with_specialist(mut self, specialist: impl Into<String>) -> Self {
        match &mut self {
            OrderLineRequest::Procedure { requires_specialist, specialist_type, .. }
            | OrderLineRequest::Diagnostic { requires_specialist, specialist_type, .. } => {
                *requires_specialist = true;
                *specialist_type = Some(specialist.into());
            }
            OrderLineRequest::Medication { .. } => {}
        }
        self
    }

    pub fn kind(&self) -> CatalogKind {
        match self {
            OrderLineRequest::Medication { .. } => CatalogKind::Medication,
            OrderLineRequest::Procedure { .. } => CatalogKind::Procedure,
            OrderLineRequest::Diagnostic { .. } => CatalogKind::Diagnostic,
        }
    }

    pub fn item_id(&self) -> InventoryItemId {
        match self {
            OrderLineRequest::Medication { item_id, .. }
            | OrderLineRequest::Procedure { item_id, .. }
            | OrderLineRequest::Diagnostic { item_id, .. } => *item_id,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            OrderLineRequest::Medication { quantity, .. }
            | OrderLineRequest::Procedure { quantity, .. }
            | OrderLineRequest::Diagnostic { quantity, .. } => *quantity,
        }
    }

    /// Structural checks that need no catalog access
    pub fn validate(&self, line_number: u32) -> Result<(), OrderError> {
        if self.quantity() == 0 {
            return Err(OrderError::validation(format!(
                "line {}: quantity must be at least 1",
                line_number
            )));
        }

        match self {
            OrderLineRequest::Medication { dosage, frequency, duration_days, .. } => {
                if dosage.trim().is_empty() || frequency.trim().is_empty() {
                    return Err(OrderError::validation(format!(
                        "line {}: medication requires dosage and frequency",
                        line_number
                    )));
                }
                if *duration_days == 0 {
                    return Err(OrderError::validation(format!(
                        "line {}: treatment duration must be at least one day",
                        line_number
                    )));
                }
            }
            OrderLineRequest::Procedure { requires_specialist, specialist_type, .. }
            | OrderLineRequest::Diagnostic { requires_specialist, specialist_type, .. } => {
                let named = specialist_type.as_deref().is_some_and(|s| !s.trim().is_empty());
                if *requires_specialist && !named {
                    return Err(OrderError::validation(format!(
                        "line {}: specialist type is required when a specialist is requested",
                        line_number
                    )));
                }
            }
        }
        Ok(())
    }

    /// Attaches the catalog unit cost
    pub(crate) fn price(self, line_number: u32, unit_cost: Money) -> PricedLine {
        match self {
            OrderLineRequest::Medication { item_id, dosage, frequency, duration_days, quantity } => {
                PricedLine::Medication(MedicationLine {
                    line_number,
                    item_id,
                    dosage,
                    frequency,
                    duration_days,
                    quantity,
                    unit_cost,
                })
            }
            OrderLineRequest::Procedure { item_id, quantity, frequency, requires_specialist, specialist_type } => {
                PricedLine::Procedure(ProcedureLine {
                    line_number,
                    item_id,
                    quantity,
                    frequency,
                    requires_specialist,
                    specialist_type,
                    unit_cost,
                })
            }
            OrderLineRequest::Diagnostic { item_id, quantity, requires_specialist, specialist_type } => {
                PricedLine::Diagnostic(DiagnosticLine {
                    line_number,
                    item_id,
                    quantity,
                    requires_specialist,
                    specialist_type,
                    unit_cost,
                })
            }
        }
    }
}

pub(crate) enum PricedLine {
    Medication(MedicationLine),
    Procedure(ProcedureLine),
    Diagnostic(DiagnosticLine),
}
