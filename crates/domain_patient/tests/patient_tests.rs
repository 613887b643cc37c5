//! Patient Domain Tests
//!
//! - `coverage_tests` - when an insurance policy covers a billing date
//! - `access_tests` - the role capability table

use chrono::NaiveDate;
use domain_patient::{AccessControl, AccessError, InsurancePolicy, Patient, Permission, Role};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod coverage_tests {
    use super::*;

    #[test]
    fn test_uninsured_patient_has_no_active_policy() {
        let patient = Patient::new("52000111", "Marta Ruiz", date(1970, 3, 3)).unwrap();
        assert!(patient.active_policy_on(date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_policy_expiring_on_billing_day_still_covers() {
        let patient = Patient::new("52000111", "Marta Ruiz", date(1970, 3, 3))
            .unwrap()
            .with_insurance(InsurancePolicy::new("Nueva EPS", "NEP-42", date(2024, 6, 30)));

        assert!(patient.active_policy_on(date(2024, 6, 30)).is_some());
        assert!(patient.active_policy_on(date(2024, 7, 1)).is_none());
    }

    #[test]
    fn test_policy_round_trips_through_json() {
        let policy = InsurancePolicy::new("Nueva EPS", "NEP-42", date(2024, 6, 30));
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains("\"expiration_date\":\"2024-06-30\""));
        assert_eq!(serde_json::from_str::<InsurancePolicy>(&json).unwrap(), policy);
    }
}

mod access_tests {
    use super::*;

    #[test]
    fn test_clinical_staff_cannot_bill() {
        for role in [Role::Doctor, Role::Nurse] {
            assert!(matches!(
                AccessControl::ensure(role, Permission::BILLING_CREATE),
                Err(AccessError::Denied { .. })
            ));
        }
    }

    #[test]
    fn test_human_resources_has_no_clinical_access() {
        let perms = AccessControl::permissions_of(Role::HumanResources);
        assert!(!perms.contains(&Permission::PATIENTS_READ));
        assert!(!perms.contains(&Permission::RECORDS_READ));
        assert!(perms.contains(&Permission::USERS_CREATE));
    }
}
