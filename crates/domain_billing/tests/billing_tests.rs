//! Billing Rule Tests
//!
//! - `policy_tests` - configuration validation and the copayment formula
//! - `settlement_tests` - how a capped ledger charge settles
//! - `serialization_tests` - wire names of the billing branch
//! - `property_tests` - split and ceiling invariants over random histories

use core_kernel::{CalendarYear, Currency, Money, PatientId, PortError};
use domain_billing::{BillingError, BillingPolicy, CappedCharge};
use proptest::prelude::*;

fn cop(units: i64) -> Money {
    Money::from_units(units, Currency::COP)
}

fn charge(requested: i64, ceiling: i64) -> CappedCharge {
    CappedCharge {
        patient_id: PatientId::new(),
        year: CalendarYear::new(2024).unwrap(),
        requested: cop(requested),
        ceiling: cop(ceiling),
        reference: None,
    }
}

mod policy_tests {
    use super::*;

    #[test]
    fn test_custom_policy() {
        let policy = BillingPolicy::new(cop(500_000), cop(25_000)).unwrap();
        assert_eq!(policy.copayment_for(cop(100_000), cop(490_000)).unwrap(), cop(10_000));
    }

    #[test]
    fn test_standard_equal_to_ceiling_is_allowed() {
        assert!(BillingPolicy::new(cop(50_000), cop(50_000)).is_ok());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        assert!(matches!(
            BillingPolicy::new(cop(-1), cop(10)),
            Err(BillingError::Validation(_))
        ));
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        let policy = BillingPolicy::default();
        assert_eq!(policy.remaining(cop(1_500_000)).unwrap(), cop(0));
        assert_eq!(policy.remaining(cop(999_999)).unwrap(), cop(1));
    }
}

mod settlement_tests {
    use super::*;

    #[test]
    fn test_settle_below_ceiling() {
        let outcome = charge(50_000, 1_000_000).settle(cop(100_000)).unwrap();
        assert_eq!(outcome.charged, cop(50_000));
        assert_eq!(outcome.accumulated_after, cop(150_000));
    }

    #[test]
    fn test_settle_at_ceiling_charges_nothing() {
        let outcome = charge(50_000, 1_000_000).settle(cop(1_000_000)).unwrap();
        assert_eq!(outcome.charged, cop(0));
        assert_eq!(outcome.accumulated_after, cop(1_000_000));
    }

    #[test]
    fn test_settle_rejects_negative_request() {
        assert!(matches!(
            charge(-10, 1_000_000).settle(cop(0)),
            Err(PortError::Validation { .. })
        ));
    }

    #[test]
    fn test_settle_rejects_mixed_currency() {
        let result = charge(50_000, 1_000_000).settle(Money::from_units(0, Currency::USD));
        assert!(result.is_err());
    }
}

mod serialization_tests {
    use super::*;
    use domain_billing::BillingBranch;

    #[test]
    fn test_branch_wire_names() {
        assert_eq!(serde_json::to_string(&BillingBranch::CeilingSaturated).unwrap(), "\"ceiling_saturated\"");
        let branch: BillingBranch = serde_json::from_str("\"uninsured\"").unwrap();
        assert_eq!(branch, BillingBranch::Uninsured);
        assert_eq!(BillingBranch::Standard.to_string(), BillingBranch::Standard.as_str());
    }
}

mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn twenty_billings_saturate_the_ceiling(costs in prop::collection::vec(50_000i64..5_000_000, 21)) {
            let policy = BillingPolicy::default();
            let mut accumulated = cop(0);

            for cost in &costs[..20] {
                let copayment = policy.copayment_for(cop(*cost), accumulated).unwrap();
                prop_assert_eq!(copayment, cop(50_000));
                accumulated = accumulated.checked_add(&copayment).unwrap();
            }

            prop_assert_eq!(accumulated, cop(1_000_000));
            prop_assert_eq!(policy.copayment_for(cop(costs[20]), accumulated).unwrap(), cop(0));
        }

        #[test]
        fn ceiling_never_exceeded_and_split_is_exact(costs in prop::collection::vec(0i64..400_000, 1..60)) {
            let policy = BillingPolicy::default();
            let mut accumulated = cop(0);

            for cost in costs {
                let total = cop(cost);
                let before = accumulated;
                let copayment = policy.copayment_for(total, accumulated).unwrap();
                let coverage = total.checked_sub(&copayment).unwrap();

                prop_assert!(!copayment.is_negative());
                prop_assert!(!coverage.is_negative());
                prop_assert_eq!(copayment.checked_add(&coverage).unwrap(), total);

                accumulated = accumulated.checked_add(&copayment).unwrap();
                prop_assert!(accumulated >= before);
                prop_assert!(accumulated <= policy.max_annual_copayment());
            }
        }
    }
}
