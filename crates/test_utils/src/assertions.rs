//! Custom Test Assertions
//!
//! Assertions for billing and numbering invariants with messages that show
//! the offending values.

use std::collections::HashSet;

use core_kernel::Money;
use domain_billing::{BillingPolicy, BillingResult};
use domain_orders::{Order, OrderNumber};

/// Asserts two amounts are equal, including currency
pub fn assert_money_eq(actual: Money, expected: Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

pub fn assert_money_zero(money: Money) {
    assert!(money.is_zero(), "Expected zero, got {}", money);
}

/// Copayment plus coverage is the total, and neither part is negative
pub fn assert_split_exact(result: &BillingResult) {
    assert!(
        !result.copayment_charged.is_negative(),
        "Negative copayment {}",
        result.copayment_charged
    );
    assert!(
        !result.insurance_coverage.is_negative(),
        "Negative coverage {}",
        result.insurance_coverage
    );
    let sum = result
        .copayment_charged
        .checked_add(&result.insurance_coverage)
        .expect("copayment and coverage share a currency");
    assert_money_eq(sum, result.total_cost);
}

/// The accumulated copayment never passes the ceiling
pub fn assert_within_ceiling(accumulated: Money, policy: &BillingPolicy) {
    assert!(
        accumulated <= policy.max_annual_copayment(),
        "Accumulated copayment {} exceeds ceiling {}",
        accumulated,
        policy.max_annual_copayment()
    );
}

/// No order number appears twice
pub fn assert_unique_numbers(numbers: &[OrderNumber]) {
    let mut seen = HashSet::with_capacity(numbers.len());
    for number in numbers {
        assert!(seen.insert(*number), "Order number {} issued twice", number);
    }
}

/// The stored total matches the sum of the lines
pub fn assert_total_consistent(order: &Order) {
    let computed = order.computed_total().expect("lines share the order currency");
    assert_money_eq(order.total_cost, computed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::cop;

    #[test]
    fn test_assert_unique_numbers_accepts_distinct() {
        let numbers: Vec<_> = (1..=5).map(|n| OrderNumber::new(n).unwrap()).collect();
        assert_unique_numbers(&numbers);
    }

    #[test]
    #[should_panic(expected = "issued twice")]
    fn test_assert_unique_numbers_rejects_duplicates() {
        let n = OrderNumber::new(7).unwrap();
        assert_unique_numbers(&[n, n]);
    }

    #[test]
    #[should_panic(expected = "exceeds ceiling")]
    fn test_assert_within_ceiling_rejects_overshoot() {
        assert_within_ceiling(cop(1_000_001), &BillingPolicy::default());
    }
}
