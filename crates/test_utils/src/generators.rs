//! Property-Based Test Generators
//!
//! Proptest strategies that respect domain invariants.

use proptest::prelude::*;

use core_kernel::{Currency, InventoryItemId, Money};
use domain_orders::{OrderLineRequest, OrderNumber};

/// Whole-peso amounts from zero up to `max_units`
pub fn cop_money_strategy(max_units: i64) -> impl Strategy<Value = Money> {
    (0i64..=max_units).prop_map(|units| Money::from_units(units, Currency::COP))
}

/// Order totals up to two million pesos, in cents
pub fn order_total_strategy() -> impl Strategy<Value = Money> {
    (0i64..200_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::COP))
}

/// Positive per-order copayment and a ceiling at least as large
pub fn policy_amounts_strategy() -> impl Strategy<Value = (Money, Money)> {
    (1i64..200_000i64, 1i64..20i64).prop_map(|(standard, multiple)| {
        let ceiling = standard * multiple + (standard / 3);
        (
            Money::from_units(ceiling, Currency::COP),
            Money::from_units(standard, Currency::COP),
        )
    })
}

/// A valid line quantity
pub fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..=50u32
}

/// Any valid order number
pub fn order_number_strategy() -> impl Strategy<Value = OrderNumber> {
    (OrderNumber::MIN..=OrderNumber::MAX).prop_map(|n| OrderNumber::new(n).unwrap())
}

/// A diagnostic line against `item_id`
pub fn diagnostic_line_strategy(item_id: InventoryItemId) -> impl Strategy<Value = OrderLineRequest> {
    quantity_strategy().prop_map(move |q| OrderLineRequest::diagnostic(item_id, q))
}

/// A medication or procedure line against one of the two item IDs
pub fn treatment_line_strategy(
    medication: InventoryItemId,
    procedure: InventoryItemId,
) -> impl Strategy<Value = OrderLineRequest> {
    prop_oneof![
        quantity_strategy()
            .prop_map(move |q| OrderLineRequest::medication(medication, "1 tablet", "every 12 hours", 5, q)),
        quantity_strategy().prop_map(move |q| OrderLineRequest::procedure(procedure, q)),
    ]
}

/// Sequences of order totals billed to one patient within a year
pub fn billing_sequence_strategy() -> impl Strategy<Value = Vec<Money>> {
    prop::collection::vec(cop_money_strategy(300_000), 1..40)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_policy_amounts_are_ordered((ceiling, standard) in policy_amounts_strategy()) {
            prop_assert!(standard.is_positive());
            prop_assert!(standard <= ceiling);
        }

        #[test]
        fn test_order_numbers_render_six_digits(number in order_number_strategy()) {
            prop_assert_eq!(number.to_string().len(), 6);
        }
    }
}
