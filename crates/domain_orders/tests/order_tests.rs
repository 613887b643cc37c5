//! Order Domain Tests
//!
//! - `order_number_tests` - formatting and parsing of six-digit numbers
//! - `category_tests` - diagnostic/treatment exclusivity
//! - `cost_tests` - order totals are the sum of unit cost × quantity

use chrono::{NaiveDate, Utc};
use core_kernel::{Currency, InventoryItemId, Money, PatientId, UserId};
use domain_orders::{
    DiagnosticLine, MedicationLine, Order, OrderCategory, OrderError, OrderLine, OrderLineRequest,
    OrderNumber, ProcedureLine,
};
use proptest::prelude::*;

fn cop(units: i64) -> Money {
    Money::from_units(units, Currency::COP)
}

fn empty_order(number: u32) -> Order {
    Order {
        number: OrderNumber::new(number).unwrap(),
        patient_id: PatientId::new(),
        doctor_id: UserId::new(),
        created_on: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        created_at: Utc::now(),
        diagnosis: None,
        category: OrderCategory::Treatment,
        medications: Vec::new(),
        procedures: Vec::new(),
        diagnostics: Vec::new(),
        total_cost: cop(0),
    }
}

mod order_number_tests {
    use super::*;

    #[test]
    fn test_every_width_pads_to_six() {
        for (value, text) in [(1, "000001"), (42, "000042"), (1_234, "001234"), (999_999, "999999")] {
            let number = OrderNumber::new(value).unwrap();
            assert_eq!(number.to_string(), text);
            assert_eq!(text.parse::<OrderNumber>().unwrap(), number);
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(OrderNumber::new(0), Err(OrderError::Validation(_))));
        assert!(matches!("1000000".parse::<OrderNumber>(), Err(OrderError::Validation(_))));
    }

    proptest! {
        #[test]
        fn display_always_six_digits(value in 1u32..=999_999) {
            let text = OrderNumber::new(value).unwrap().to_string();
            prop_assert_eq!(text.len(), 6);
            prop_assert!(text.bytes().all(|b| b.is_ascii_digit()));
            prop_assert_eq!(text.parse::<OrderNumber>().unwrap().value(), value);
        }
    }
}

mod category_tests {
    use super::*;

    #[test]
    fn test_diagnostic_only_order() {
        let lines = vec![
            OrderLineRequest::diagnostic(InventoryItemId::new(), 1),
            OrderLineRequest::diagnostic(InventoryItemId::new(), 2).with_specialist("radiologist"),
        ];
        assert_eq!(OrderCategory::classify(&lines).unwrap(), OrderCategory::Diagnostic);
    }

    #[test]
    fn test_medication_and_diagnostic_rejected() {
        let lines = vec![
            OrderLineRequest::medication(InventoryItemId::new(), "1g", "every 12h", 5, 10),
            OrderLineRequest::diagnostic(InventoryItemId::new(), 1),
        ];
        assert!(matches!(OrderCategory::classify(&lines), Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_with_specialist_ignored_for_medication() {
        let line = OrderLineRequest::medication(InventoryItemId::new(), "1g", "daily", 3, 3)
            .with_specialist("cardiologist");
        assert!(matches!(line, OrderLineRequest::Medication { .. }));
    }
}

mod cost_tests {
    use super::*;

    #[test]
    fn test_computed_total_over_all_line_kinds() {
        let mut order = empty_order(1);
        order.medications.push(MedicationLine {
            line_number: 1,
            item_id: InventoryItemId::new(),
            dosage: "500mg".into(),
            frequency: "every 8h".into(),
            duration_days: 7,
            quantity: 21,
            unit_cost: cop(1_200),
        });
        order.procedures.push(ProcedureLine {
            line_number: 2,
            item_id: InventoryItemId::new(),
            quantity: 1,
            frequency: None,
            requires_specialist: true,
            specialist_type: Some("plastic surgeon".into()),
            unit_cost: cop(85_000),
        });

        assert_eq!(order.computed_total().unwrap(), cop(25_200 + 85_000));
    }

    proptest! {
        #[test]
        fn total_is_sum_of_line_totals(
            lines in prop::collection::vec((1i64..500_000, 1u32..50), 1..12)
        ) {
            let mut order = empty_order(7);
            order.category = OrderCategory::Diagnostic;
            let mut expected = 0i64;
            for (i, (unit, qty)) in lines.iter().enumerate() {
                order.diagnostics.push(DiagnosticLine {
                    line_number: i as u32 + 1,
                    item_id: InventoryItemId::new(),
                    quantity: *qty,
                    requires_specialist: false,
                    specialist_type: None,
                    unit_cost: cop(*unit),
                });
                expected += unit * *qty as i64;
            }

            let line_sum = order
                .diagnostics
                .iter()
                .map(|l| l.line_total().unwrap())
                .fold(cop(0), |acc, m| acc.checked_add(&m).unwrap());

            prop_assert_eq!(order.computed_total().unwrap(), cop(expected));
            prop_assert_eq!(line_sum, cop(expected));
        }
    }
}
