//! Pre-built Test Fixtures
//!
//! Consistent, predictable data for unit and workflow tests. Amounts are in
//! Colombian pesos unless stated otherwise.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;

use core_kernel::{Currency, Money};
use domain_billing::BillingPolicy;
use domain_orders::CatalogItem;
use domain_patient::{InsurancePolicy, Patient, Role, User};

/// Default billing rules: 1,000,000 ceiling, 50,000 per order
pub static DEFAULT_POLICY: Lazy<BillingPolicy> = Lazy::new(BillingPolicy::default);

/// Shorthand for a whole-peso amount
pub fn cop(units: i64) -> Money {
    Money::from_units(units, Currency::COP)
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The default per-order copayment
    pub fn standard_copayment() -> Money {
        cop(BillingPolicy::DEFAULT_STANDARD_COPAYMENT)
    }

    /// The default annual ceiling
    pub fn annual_ceiling() -> Money {
        cop(BillingPolicy::DEFAULT_MAX_ANNUAL_COPAYMENT)
    }

    /// A total cheaper than the standard copayment
    pub fn small_total() -> Money {
        cop(30_000)
    }

    /// A typical treatment order total
    pub fn treatment_total() -> Money {
        cop(240_000)
    }

    /// An amount in a foreign currency, for mismatch tests
    pub fn usd_100() -> Money {
        Money::from_units(100, Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Mid-afternoon in Bogotá on a regular working day (2024-09-10)
    pub fn billing_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 19, 0, 0).unwrap()
    }

    /// 2025-01-01 03:00 UTC, which is still 2024-12-31 in Bogotá
    pub fn new_years_eve_local() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).unwrap()
    }

    /// 2025-01-01 06:00 UTC, already 2025 in Bogotá
    pub fn new_year_local() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap()
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Date of birth for adult test patients
    pub fn adult_birth_date() -> NaiveDate {
        Self::date(1985, 3, 14)
    }
}

/// Fixture for patients
pub struct PatientFixtures;

impl PatientFixtures {
    /// A policy valid through 2030
    pub fn active_policy() -> InsurancePolicy {
        InsurancePolicy::new("Sura EPS", "SUR-2024-0001", TemporalFixtures::date(2030, 12, 31))
    }

    /// A policy that lapsed at the end of 2023
    pub fn expired_policy() -> InsurancePolicy {
        InsurancePolicy::new("Sanitas", "SAN-2023-0042", TemporalFixtures::date(2023, 12, 31))
    }

    pub fn insured() -> Patient {
        Patient::new("1020304050", "Ana Gómez", TemporalFixtures::adult_birth_date())
            .unwrap()
            .with_insurance(Self::active_policy())
    }

    pub fn uninsured() -> Patient {
        Patient::new("79111222", "Jorge Díaz", TemporalFixtures::adult_birth_date()).unwrap()
    }

    pub fn with_expired_policy() -> Patient {
        Patient::new("52333444", "Marta Ruiz", TemporalFixtures::adult_birth_date())
            .unwrap()
            .with_insurance(Self::expired_policy())
    }
}

/// Fixture for staff users
pub struct StaffFixtures;

impl StaffFixtures {
    pub fn doctor() -> User {
        User::new("dr.perez", "Laura Pérez", Role::Doctor)
    }

    pub fn nurse() -> User {
        User::new("enf.rios", "Camilo Ríos", Role::Nurse)
    }

    pub fn clerk() -> User {
        User::new("adm.lopez", "Sofía López", Role::Administrative)
    }

    pub fn inactive_doctor() -> User {
        let mut user = User::new("dr.salas", "Andrés Salas", Role::Doctor);
        user.active = false;
        user
    }
}

/// Fixture for catalog items
pub struct CatalogFixtures;

impl CatalogFixtures {
    pub fn amoxicillin() -> CatalogItem {
        CatalogItem::medication("Amoxicilina 500 mg", cop(1_200))
    }

    pub fn physiotherapy() -> CatalogItem {
        CatalogItem::procedure("Sesión de fisioterapia", cop(80_000))
    }

    pub fn blood_count() -> CatalogItem {
        CatalogItem::diagnostic("Hemograma completo", cop(35_000))
    }

    pub fn chest_xray() -> CatalogItem {
        CatalogItem::diagnostic("Radiografía de tórax", cop(120_000))
    }

    /// An item that has been withdrawn from the catalog
    pub fn retired_medication() -> CatalogItem {
        let mut item = CatalogItem::medication("Ranitidina 150 mg", cop(900));
        item.active = false;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Timezone;

    #[test]
    fn test_new_years_eve_is_still_old_year_locally() {
        let tz = Timezone::default();
        assert_eq!(tz.local_date(TemporalFixtures::new_years_eve_local()), TemporalFixtures::date(2024, 12, 31));
        assert_eq!(tz.local_date(TemporalFixtures::new_year_local()), TemporalFixtures::date(2025, 1, 1));
    }

    #[test]
    fn test_patient_fixtures_coverage() {
        let today = TemporalFixtures::date(2024, 9, 10);
        assert!(PatientFixtures::insured().active_policy_on(today).is_some());
        assert!(PatientFixtures::uninsured().active_policy_on(today).is_none());
        assert!(PatientFixtures::with_expired_policy().active_policy_on(today).is_none());
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(DEFAULT_POLICY.max_annual_copayment(), MoneyFixtures::annual_ceiling());
        assert_eq!(DEFAULT_POLICY.standard_copayment(), MoneyFixtures::standard_copayment());
    }
}
