//! Unit tests for the Money module
//!
//! Covers creation, checked arithmetic, ordering between amounts, and the
//! currency guard rails the billing engine relies on.

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;
use std::cmp::Ordering;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_converts_cents_correctly() {
        let m = Money::from_minor(5_000_000, Currency::COP);
        assert_eq!(m.amount(), dec!(50000.00));
    }

    #[test]
    fn test_only_hospital_currencies_parse() {
        assert_eq!("cop".parse::<Currency>().unwrap(), Currency::COP);
        assert_eq!(" USD ".parse::<Currency>().unwrap(), Currency::USD);
        assert!(matches!("EUR".parse::<Currency>(), Err(MoneyError::UnknownCurrency(_))));
    }

    #[test]
    fn test_zero_is_neither_positive_nor_negative() {
        let m = Money::zero(Currency::COP);
        assert!(m.is_zero());
        assert!(!m.is_positive());
        assert!(!m.is_negative());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::from_units(980_000, Currency::COP);
        let b = Money::from_units(20_000, Currency::COP);
        assert_eq!(a.checked_add(&b).unwrap(), Money::from_units(1_000_000, Currency::COP));
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::from_units(30, Currency::COP);
        let b = Money::from_units(100, Currency::COP);
        assert_eq!(a.checked_sub(&b).unwrap().amount(), dec!(-70));
    }

    #[test]
    fn test_checked_sum_rejects_mixed_currencies() {
        let amounts = vec![
            Money::from_units(10, Currency::COP),
            Money::from_units(10, Currency::USD),
        ];
        let result = Money::checked_sum(&amounts, Currency::COP);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_checked_sum_of_empty_is_zero() {
        let amounts: Vec<Money> = vec![];
        assert!(Money::checked_sum(&amounts, Currency::COP).unwrap().is_zero());
    }

    #[test]
    fn test_mul_quantity_zero() {
        let unit = Money::from_units(12_000, Currency::COP);
        assert!(unit.checked_mul_quantity(0).unwrap().is_zero());
    }
}

mod comparison {
    use super::*;

    #[test]
    fn test_ordering_same_currency() {
        let a = Money::from_units(50_000, Currency::COP);
        let b = Money::from_units(1_000_000, Currency::COP);

        assert!(a < b);
        assert!(b >= a);
        assert_eq!(a.checked_cmp(&b).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_equal_amounts_compare_equal_without_epsilon() {
        let a = Money::new(dec!(1000000.0000), Currency::COP);
        let b = Money::from_units(1_000_000, Currency::COP);
        assert!(a >= b);
        assert!(a <= b);
    }

    #[test]
    fn test_ordering_across_currencies_is_an_error() {
        let a = Money::from_units(1, Currency::COP);
        let b = Money::from_units(1, Currency::USD);
        assert!(a.checked_cmp(&b).is_err());
        assert!(!(a < b) && !(a >= b));
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_uses_currency_places() {
        let m = Money::from_units(50_000, Currency::COP);
        assert_eq!(m.to_string(), "COL$ 50000.00");
    }

    #[test]
    fn test_serde_round_trip_keeps_currency_code() {
        let m = Money::from_units(50_000, Currency::COP);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"COP\""));
    }
}
