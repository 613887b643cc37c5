//! The order aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Currency, Money, MoneyError, PatientId, UserId};

use crate::lines::{DiagnosticLine, MedicationLine, OrderLine, OrderLineRequest, PricedLine, ProcedureLine};
use crate::order_number::OrderNumber;
use crate::error::OrderError;

/// What an order is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderCategory {
    /// Diagnostic aids only
    Diagnostic,
    /// Medications and/or procedures
    Treatment,
}

impl OrderCategory {
    /// Classifies a set of requested lines
    ///
    /// Fails when the set is empty or mixes diagnostic lines with
    /// medications or procedures.
    pub fn classify(lines: &[OrderLineRequest]) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::validation("an order needs at least one line"));
        }

        let diagnostics = lines
            .iter()
            .filter(|l| matches!(l, OrderLineRequest::Diagnostic { .. }))
            .count();

        match diagnostics {
            0 => Ok(OrderCategory::Treatment),
            n if n == lines.len() => Ok(OrderCategory::Diagnostic),
            _ => Err(OrderError::validation(
                "diagnostic aids cannot be combined with medications or procedures in one order",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderCategory::Diagnostic => "diagnostic",
            OrderCategory::Treatment => "treatment",
        }
    }
}

impl fmt::Display for OrderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully priced order still waiting for its number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub patient_id: PatientId,
    pub doctor_id: UserId,
    pub created_on: NaiveDate,
    pub diagnosis: Option<String>,
    pub category: OrderCategory,
    pub medications: Vec<MedicationLine>,
    pub procedures: Vec<ProcedureLine>,
    pub diagnostics: Vec<DiagnosticLine>,
    pub total_cost: Money,
}

impl OrderDraft {
    pub(crate) fn from_priced(
        patient_id: PatientId,
        doctor_id: UserId,
        created_on: NaiveDate,
        diagnosis: Option<String>,
        category: OrderCategory,
        lines: Vec<PricedLine>,
        currency: Currency,
    ) -> Result<Self, OrderError> {
        let mut draft = Self {
            patient_id,
            doctor_id,
            created_on,
            diagnosis: diagnosis.filter(|d| !d.trim().is_empty()),
            category,
            medications: Vec::new(),
            procedures: Vec::new(),
            diagnostics: Vec::new(),
            total_cost: Money::zero(currency),
        };

        for line in lines {
            match line {
                PricedLine::Medication(l) => draft.medications.push(l),
                PricedLine::Procedure(l) => draft.procedures.push(l),
                PricedLine::Diagnostic(l) => draft.diagnostics.push(l),
            }
        }

        draft.total_cost = total_of(&draft.medications, &draft.procedures, &draft.diagnostics, currency)?;
        Ok(draft)
    }

    /// Stamps the allocated number onto the draft
    pub fn into_order(self, number: OrderNumber, created_at: DateTime<Utc>) -> Order {
        Order {
            number,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            created_on: self.created_on,
            created_at,
            diagnosis: self.diagnosis,
            category: self.category,
            medications: self.medications,
            procedures: self.procedures,
            diagnostics: self.diagnostics,
            total_cost: self.total_cost,
        }
    }
}

/// A persisted medical order
///
/// `total_cost` is fixed at creation from the catalog prices of that moment;
/// later price changes do not alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub number: OrderNumber,
    pub patient_id: PatientId,
    pub doctor_id: UserId,
    pub created_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub diagnosis: Option<String>,
    pub category: OrderCategory,
    pub medications: Vec<MedicationLine>,
    pub procedures: Vec<ProcedureLine>,
    pub diagnostics: Vec<DiagnosticLine>,
    pub total_cost: Money,
}

impl Order {
    pub fn line_count(&self) -> usize {
        self.medications.len() + self.procedures.len() + self.diagnostics.len()
    }

    /// Recomputes Σ unit cost × quantity over all lines
    pub fn computed_total(&self) -> Result<Money, MoneyError> {
        total_of(
            &self.medications,
            &self.procedures,
            &self.diagnostics,
            self.total_cost.currency(),
        )
    }

    /// One-line summary for the patient's medical record
    pub fn record_summary(&self) -> String {
        let mut summary = format!(
            "{} order {} issued with {} line(s), total {}",
            self.category,
            self.number,
            self.line_count(),
            self.total_cost
        );
        if let Some(diagnosis) = &self.diagnosis {
            summary.push_str(&format!("; diagnosis: {}", diagnosis));
        }
        summary
    }
}

fn total_of(
    medications: &[MedicationLine],
    procedures: &[ProcedureLine],
    diagnostics: &[DiagnosticLine],
    currency: Currency,
) -> Result<Money, MoneyError> {
    let mut total = Money::zero(currency);
    for line in medications {
        total = total.checked_add(&line.line_total()?)?;
    }
    for line in procedures {
        total = total.checked_add(&line.line_total()?)?;
    }
    for line in diagnostics {
        total = total.checked_add(&line.line_total()?)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::InventoryItemId;

    fn cop(units: i64) -> Money {
        Money::from_units(units, Currency::COP)
    }

    #[test]
    fn test_classify_rejects_mixed_lines() {
        let lines = vec![
            OrderLineRequest::diagnostic(InventoryItemId::new(), 1),
            OrderLineRequest::procedure(InventoryItemId::new(), 1),
        ];
        assert!(matches!(OrderCategory::classify(&lines), Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            OrderCategory::classify(&[OrderLineRequest::diagnostic(InventoryItemId::new(), 1)]).unwrap(),
            OrderCategory::Diagnostic
        );
        assert_eq!(
            OrderCategory::classify(&[
                OrderLineRequest::procedure(InventoryItemId::new(), 1),
                OrderLineRequest::medication(InventoryItemId::new(), "1g", "daily", 5, 5),
            ])
            .unwrap(),
            OrderCategory::Treatment
        );
        assert!(OrderCategory::classify(&[]).is_err());
    }

    #[test]
    fn test_draft_total_sums_all_lines() {
        let lines = vec![
            OrderLineRequest::medication(InventoryItemId::new(), "500mg", "every 8h", 7, 21).price(1, cop(1_200)),
            OrderLineRequest::procedure(InventoryItemId::new(), 2).price(2, cop(85_000)),
        ];
        let draft = OrderDraft::from_priced(
            PatientId::new(),
            UserId::new(),
            NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
            Some("  ".into()),
            OrderCategory::Treatment,
            lines,
            Currency::COP,
        )
        .unwrap();

        assert_eq!(draft.total_cost, cop(21 * 1_200 + 2 * 85_000));
        assert_eq!(draft.diagnosis, None);

        let order = draft.into_order(OrderNumber::new(3).unwrap(), Utc::now());
        assert_eq!(order.computed_total().unwrap(), order.total_cost);
        assert!(order.record_summary().starts_with("treatment order 000003 issued with 2 line(s)"));
    }

    #[test]
    fn test_draft_rejects_mixed_currency() {
        let lines = vec![OrderLineRequest::procedure(InventoryItemId::new(), 1)
            .price(1, Money::from_units(10, Currency::USD))];
        let result = OrderDraft::from_priced(
            PatientId::new(),
            UserId::new(),
            NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
            None,
            OrderCategory::Treatment,
            lines,
            Currency::COP,
        );
        assert!(matches!(result, Err(OrderError::Calculation(MoneyError::CurrencyMismatch(_, _)))));
    }
}
