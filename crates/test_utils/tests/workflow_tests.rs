//! Workflow tests
//!
//! End-to-end scenarios across patients, orders and billing, run against
//! the in-memory hospital.

use std::sync::Arc;

use core_kernel::{CalendarYear, Money};
use domain_billing::{BillingBranch, BillingError, CopaymentLedger};
use domain_orders::{OrderCategory, OrderError, OrderStore};
use domain_patient::{AccessError, MedicalRecordPort};
use test_utils::*;

fn year(value: i32) -> CalendarYear {
    CalendarYear::new(value).unwrap()
}

mod order_to_invoice_workflow {
    use super::*;

    #[tokio::test]
    async fn test_insured_patient_pays_standard_copayment() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();
        assert_eq!(order.number.to_string(), "000001");
        assert_eq!(order.category, OrderCategory::Diagnostic);
        assert_money_eq(order.total_cost, cop(70_000));

        let invoice = hospital.bill(order.number).await.unwrap();
        assert_split_exact(&invoice.result);
        assert_eq!(invoice.result.branch, BillingBranch::Standard);
        assert_money_eq(invoice.patient_due(), cop(50_000));
        assert_money_eq(invoice.insurer_due(), cop(20_000));
        assert_eq!(invoice.invoice_number, "INV-2024-000001");
        assert_eq!(invoice.result.accumulated_copayment, Some(cop(50_000)));
    }

    #[tokio::test]
    async fn test_cheap_order_copayment_is_the_total() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        let order = hospital.diagnostic_order(patient.id, 1).await.unwrap();
        let invoice = hospital.bill(order.number).await.unwrap();

        assert_money_eq(invoice.patient_due(), cop(35_000));
        assert_money_zero(invoice.insurer_due());
        assert_split_exact(&invoice.result);
    }

    #[tokio::test]
    async fn test_uninsured_patient_pays_in_full_and_ledger_is_untouched() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::uninsured()).await;

        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();
        let invoice = hospital.bill(order.number).await.unwrap();

        assert!(invoice.result.requires_full_payment);
        assert_eq!(invoice.result.branch, BillingBranch::Uninsured);
        assert_money_eq(invoice.patient_due(), cop(70_000));
        assert_eq!(invoice.result.accumulated_copayment, None);
        assert_money_zero(hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_policy_is_treated_as_uninsured() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::with_expired_policy()).await;

        let order = hospital.diagnostic_order(patient.id, 1).await.unwrap();
        let invoice = hospital.bill(order.number).await.unwrap();

        assert_eq!(invoice.result.branch, BillingBranch::Uninsured);
        assert!(invoice.result.requires_full_payment);
    }

    #[tokio::test]
    async fn test_policy_expiring_today_still_covers() {
        let hospital = TestHospital::new().await;
        let patient = hospital
            .admit(PatientBuilder::new().insured_until(TemporalFixtures::date(2024, 9, 10)).build())
            .await;

        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();
        let invoice = hospital.bill(order.number).await.unwrap();

        assert_eq!(invoice.result.branch, BillingBranch::Standard);
    }

    #[tokio::test]
    async fn test_order_is_billed_once() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;
        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();

        hospital.bill(order.number).await.unwrap();
        let second = hospital.bill(order.number).await;

        assert!(matches!(second, Err(BillingError::AlreadyBilled(_))));
        assert_money_eq(
            hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap(),
            cop(50_000),
        );
    }

    #[tokio::test]
    async fn test_billing_retried_after_invoice_store_outage() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;
        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();

        hospital.invoices.fail_next_saves(2);
        assert!(matches!(hospital.bill(order.number).await, Err(BillingError::Port(_))));
        assert!(matches!(hospital.bill(order.number).await, Err(BillingError::Port(_))));
        assert_money_zero(hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap());

        let invoice = hospital.bill(order.number).await.unwrap();
        assert_money_eq(invoice.patient_due(), cop(50_000));
        assert_money_eq(
            hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap(),
            cop(50_000),
        );
    }

    #[tokio::test]
    async fn test_record_outage_leaves_no_order_behind() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        hospital.records.set_fail_appends(true);
        assert!(matches!(
            hospital.diagnostic_order(patient.id, 1).await,
            Err(OrderError::Port(_))
        ));
        assert_eq!(hospital.orders.count().await.unwrap(), 0);

        hospital.records.set_fail_appends(false);
        let order = hospital.diagnostic_order(patient.id, 1).await.unwrap();
        assert_eq!(order.number.to_string(), "000001");
        assert_eq!(hospital.records.entries_for(patient.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_doctor_cannot_bill() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;
        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();

        let result = hospital.billing.bill_order(order.number, hospital.doctor.id).await;
        assert!(matches!(result, Err(BillingError::Access(AccessError::Denied { .. }))));
        assert_eq!(hospital.invoices.len().await, 0);
    }
}

mod ordering_rules {
    use super::*;

    #[tokio::test]
    async fn test_treatment_order_mixes_medication_and_procedure() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        let request = hospital
            .order_for(patient.id)
            .diagnosis("Lumbalgia mecánica")
            .medication(hospital.catalog.amoxicillin.id, 21)
            .procedure(hospital.catalog.physiotherapy.id, 3)
            .build();
        let order = hospital.aggregator.create_order(request).await.unwrap();

        assert_eq!(order.category, OrderCategory::Treatment);
        assert_eq!(order.medications[0].line_number, 1);
        assert_eq!(order.procedures[0].line_number, 2);
        assert_money_eq(order.total_cost, cop(21 * 1_200 + 3 * 80_000));
        assert_total_consistent(&order);
    }

    #[tokio::test]
    async fn test_diagnostic_and_treatment_lines_do_not_mix() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        let request = hospital
            .order_for(patient.id)
            .diagnostic(hospital.catalog.chest_xray.id, 1)
            .medication(hospital.catalog.amoxicillin.id, 10)
            .build();
        let result = hospital.aggregator.create_order(request).await;

        assert!(matches!(result, Err(OrderError::Validation(_))));
        assert_eq!(hospital.orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_nurse_and_inactive_doctor_cannot_order() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;
        let nurse = hospital.hire(StaffFixtures::nurse()).await;
        let retired = hospital.hire(StaffFixtures::inactive_doctor()).await;

        for (actor, expect_inactive) in [(nurse.id, false), (retired.id, true)] {
            let request = OrderRequestBuilder::new(patient.id, actor)
                .diagnostic(hospital.catalog.blood_count.id, 1)
                .build();
            match hospital.aggregator.create_order(request).await {
                Err(OrderError::Access(AccessError::InactiveUser(_))) => assert!(expect_inactive),
                Err(OrderError::Access(AccessError::ClinicianRequired(_))) => assert!(!expect_inactive),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_retired_catalog_item_is_not_found() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;
        let retired = hospital.stock(CatalogFixtures::retired_medication()).await;

        let request = hospital.order_for(patient.id).medication(retired.id, 1).build();
        let result = hospital.aggregator.create_order(request).await;

        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let hospital = TestHospital::new().await;
        let stranger = PatientBuilder::new().build();

        let result = hospital.diagnostic_order(stranger.id, 1).await;
        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_each_order_appends_a_record_entry() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        let first = hospital.diagnostic_order(patient.id, 1).await.unwrap();
        let second = hospital.diagnostic_order(patient.id, 3).await.unwrap();

        let entries = hospital.records.entries_for(patient.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].order_number, Some(first.number.to_string()));
        assert_eq!(entries[1].order_number, Some(second.number.to_string()));
        assert_eq!(entries[0].author_id, hospital.doctor.id);
    }

    #[tokio::test]
    async fn test_small_number_space_exhausts() {
        let hospital = TestHospital::builder().capacity(3).build().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        for _ in 0..3 {
            hospital.diagnostic_order(patient.id, 1).await.unwrap();
        }
        let result = hospital.diagnostic_order(patient.id, 1).await;

        assert!(matches!(result, Err(OrderError::NumberSpaceExhausted { capacity: 3 })));
        assert_eq!(hospital.orders.count().await.unwrap(), 3);
    }
}

mod annual_ceiling_workflow {
    use super::*;

    #[tokio::test]
    async fn test_twenty_orders_reach_the_ceiling() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        for _ in 0..20 {
            let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();
            let invoice = hospital.bill(order.number).await.unwrap();
            assert_eq!(invoice.result.branch, BillingBranch::Standard);
        }

        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();
        let invoice = hospital.bill(order.number).await.unwrap();

        assert_eq!(invoice.result.branch, BillingBranch::CeilingReached);
        assert_money_zero(invoice.patient_due());
        assert_money_eq(invoice.insurer_due(), cop(70_000));
        assert_money_eq(
            hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap(),
            MoneyFixtures::annual_ceiling(),
        );
    }

    #[tokio::test]
    async fn test_charge_is_cut_to_remaining_headroom() {
        let hospital = TestHospital::new().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;
        hospital
            .ledger
            .add_charge(patient.id, year(2024), cop(980_000))
            .await
            .unwrap();

        let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();
        let invoice = hospital.bill(order.number).await.unwrap();

        assert_eq!(invoice.result.branch, BillingBranch::CeilingSaturated);
        assert_money_eq(invoice.patient_due(), cop(20_000));
        assert_money_eq(invoice.insurer_due(), cop(50_000));
        assert_split_exact(&invoice.result);
    }

    #[tokio::test]
    async fn test_year_follows_the_hospital_calendar() {
        let eve = TestHospital::builder()
            .at(TemporalFixtures::new_years_eve_local())
            .build()
            .await;
        let patient = eve.admit(PatientFixtures::insured()).await;
        eve.ledger
            .add_charge(patient.id, year(2024), MoneyFixtures::annual_ceiling())
            .await
            .unwrap();

        let order = eve.diagnostic_order(patient.id, 2).await.unwrap();
        assert_eq!(order.created_on, TemporalFixtures::date(2024, 12, 31));
        let invoice = eve.bill(order.number).await.unwrap();
        assert_eq!(invoice.result.year, year(2024));
        assert_eq!(invoice.result.branch, BillingBranch::CeilingReached);

        let new_year = TestHospital::builder()
            .at(TemporalFixtures::new_year_local())
            .build()
            .await;
        let patient = new_year.admit(PatientFixtures::insured()).await;
        let order = new_year.diagnostic_order(patient.id, 2).await.unwrap();
        let invoice = new_year.bill(order.number).await.unwrap();
        assert_eq!(invoice.result.year, year(2025));
        assert_eq!(invoice.result.branch, BillingBranch::Standard);
    }

    #[tokio::test]
    async fn test_custom_policy_is_honoured() {
        let policy = domain_billing::BillingPolicy::new(cop(100_000), cop(40_000)).unwrap();
        let hospital = TestHospital::builder().policy(policy).build().await;
        let patient = hospital.admit(PatientFixtures::insured()).await;

        let mut charged = Vec::new();
        for _ in 0..4 {
            let order = hospital.diagnostic_order(patient.id, 2).await.unwrap();
            charged.push(hospital.bill(order.number).await.unwrap().patient_due());
        }

        assert_eq!(charged, vec![cop(40_000), cop(40_000), cop(20_000), cop(0)]);
        assert_within_ceiling(
            hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap(),
            &policy,
        );
    }
}

mod concurrency {
    use super::*;
    use tokio::task::JoinSet;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_get_unique_numbers() {
        let hospital = Arc::new(TestHospital::new().await);
        let patient_id = hospital.admit(PatientFixtures::insured()).await.id;

        let mut tasks = JoinSet::new();
        for _ in 0..50 {
            let hospital = hospital.clone();
            tasks.spawn(async move { hospital.diagnostic_order(patient_id, 1).await });
        }

        let mut numbers = Vec::new();
        while let Some(result) = tasks.join_next().await {
            numbers.push(result.unwrap().unwrap().number);
        }

        assert_eq!(numbers.len(), 50);
        assert_unique_numbers(&numbers);
        assert_eq!(hospital.records.len().await, 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_billing_never_passes_the_ceiling() {
        let hospital = Arc::new(TestHospital::new().await);
        let patient = hospital.admit(PatientFixtures::insured()).await;

        let mut numbers = Vec::new();
        for _ in 0..30 {
            numbers.push(hospital.diagnostic_order(patient.id, 2).await.unwrap().number);
        }

        let mut tasks = JoinSet::new();
        for number in numbers {
            let hospital = hospital.clone();
            tasks.spawn(async move { hospital.bill(number).await });
        }

        let mut copayments = Vec::new();
        while let Some(result) = tasks.join_next().await {
            let invoice = result.unwrap().unwrap();
            assert_split_exact(&invoice.result);
            copayments.push(invoice.patient_due());
        }

        let total = Money::checked_sum(copayments.iter(), hospital.currency).unwrap();
        assert_money_eq(total, MoneyFixtures::annual_ceiling());
        assert_eq!(copayments.iter().filter(|c| c.is_zero()).count(), 10);
        assert_money_eq(
            hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap(),
            MoneyFixtures::annual_ceiling(),
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_bills_of_one_order_charge_once() {
        let hospital = Arc::new(TestHospital::new().await);
        let patient = hospital.admit(PatientFixtures::insured()).await;
        let number = hospital.diagnostic_order(patient.id, 2).await.unwrap().number;

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let hospital = hospital.clone();
            tasks.spawn(async move { hospital.bill(number).await });
        }

        let mut issued = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => issued += 1,
                Err(BillingError::AlreadyBilled(_)) => {}
                Err(other) => panic!("unexpected error {other}"),
            }
        }

        assert_eq!(issued, 1);
        assert_money_eq(
            hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap(),
            cop(50_000),
        );
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn test_any_billing_sequence_respects_ceiling_and_split(totals in billing_sequence_strategy()) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let hospital = TestHospital::new().await;
                let patient = hospital.admit(PatientFixtures::insured()).await;

                for (index, total) in totals.iter().enumerate() {
                    let order = StoredOrderBuilder::new(index as u32 + 1, patient.id)
                        .doctor(hospital.doctor.id)
                        .total(*total)
                        .build();
                    hospital.orders.insert(&order).await.unwrap();

                    let invoice = hospital.bill(order.number).await.unwrap();
                    assert_split_exact(&invoice.result);
                    assert!(invoice.patient_due() <= MoneyFixtures::standard_copayment());
                }

                let accumulated = hospital.ledger.get_accumulated(patient.id, year(2024)).await.unwrap();
                assert_within_ceiling(accumulated, &DEFAULT_POLICY);
            });
        }
    }
}
