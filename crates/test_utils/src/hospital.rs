//! In-memory hospital
//!
//! [`TestHospital`] wires the order aggregator and the billing service onto
//! the in-memory port implementations, seeded with one doctor, one clerk
//! and a small catalog. The clock is fixed so order dates and billing
//! years are deterministic.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use core_kernel::{Currency, FixedClock, Money, PatientId, SharedClock, Timezone};
use domain_billing::{
    BillingCalculator, BillingError, BillingPolicy, BillingService, Invoice, MockCopaymentLedger, MockInvoiceStore,
};
use domain_orders::{
    CatalogItem, MockInventoryPort, MockOrderStore, Order, OrderAggregator, OrderError, OrderNumber,
    OrderNumberAllocator, OrderNumberSpace, OrderingConfig,
};
use domain_patient::{MockMedicalRecordPort, MockPatientPort, MockStaffPort, Patient, PatientPort, StaffPort, User};

use crate::builders::OrderRequestBuilder;
use crate::fixtures::{CatalogFixtures, StaffFixtures, TemporalFixtures};

/// Options for [`TestHospital`]
pub struct TestHospitalBuilder {
    capacity: u32,
    policy: BillingPolicy,
    now: DateTime<Utc>,
    timezone: Timezone,
}

impl Default for TestHospitalBuilder {
    fn default() -> Self {
        Self {
            capacity: OrderNumber::MAX,
            policy: BillingPolicy::default(),
            now: TemporalFixtures::billing_instant(),
            timezone: Timezone::default(),
        }
    }
}

impl TestHospitalBuilder {
    /// Shrinks the order-number space, for exhaustion tests
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn policy(mut self, policy: BillingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fixes the clock at `now`
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub async fn build(self) -> TestHospital {
        let currency = self.policy.currency();
        let doctor = StaffFixtures::doctor();
        let clerk = StaffFixtures::clerk();
        let catalog = Catalog {
            amoxicillin: CatalogFixtures::amoxicillin(),
            physiotherapy: CatalogFixtures::physiotherapy(),
            blood_count: CatalogFixtures::blood_count(),
            chest_xray: CatalogFixtures::chest_xray(),
        };

        let patients = Arc::new(MockPatientPort::new());
        let staff = Arc::new(MockStaffPort::with_users(vec![doctor.clone(), clerk.clone()]).await);
        let inventory = Arc::new(MockInventoryPort::with_items(catalog.all()).await);
        let records = Arc::new(MockMedicalRecordPort::new());
        let orders = Arc::new(MockOrderStore::with_records(records.clone()));
        let ledger = Arc::new(MockCopaymentLedger::new(currency));
        let invoices = Arc::new(MockInvoiceStore::new());
        let clock: SharedClock = Arc::new(FixedClock(self.now));

        let space = OrderNumberSpace::new(self.capacity).expect("capacity within the order-number space");
        let allocator = Arc::new(OrderNumberAllocator::new(orders.clone(), space));
        let aggregator = OrderAggregator::new(
            patients.clone(),
            staff.clone(),
            inventory.clone(),
            orders.clone(),
            allocator,
            clock.clone(),
            OrderingConfig {
                currency,
                timezone: self.timezone,
            },
        );
        let calculator = Arc::new(BillingCalculator::new(
            patients.clone(),
            ledger.clone(),
            self.policy,
            clock,
            self.timezone,
        ));
        let billing = BillingService::new(staff.clone(), orders.clone(), invoices.clone(), calculator);

        TestHospital {
            aggregator: Arc::new(aggregator),
            billing: Arc::new(billing),
            patients,
            staff,
            inventory,
            records,
            orders,
            ledger,
            invoices,
            doctor,
            clerk,
            catalog,
            currency,
        }
    }
}

/// The seeded catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    pub amoxicillin: CatalogItem,
    pub physiotherapy: CatalogItem,
    pub blood_count: CatalogItem,
    pub chest_xray: CatalogItem,
}

impl Catalog {
    pub fn all(&self) -> Vec<CatalogItem> {
        vec![
            self.amoxicillin.clone(),
            self.physiotherapy.clone(),
            self.blood_count.clone(),
            self.chest_xray.clone(),
        ]
    }
}

/// The whole engine on in-memory ports
pub struct TestHospital {
    pub aggregator: Arc<OrderAggregator>,
    pub billing: Arc<BillingService>,
    pub patients: Arc<MockPatientPort>,
    pub staff: Arc<MockStaffPort>,
    pub inventory: Arc<MockInventoryPort>,
    pub records: Arc<MockMedicalRecordPort>,
    pub orders: Arc<MockOrderStore>,
    pub ledger: Arc<MockCopaymentLedger>,
    pub invoices: Arc<MockInvoiceStore>,
    /// Active doctor allowed to create orders
    pub doctor: User,
    /// Administrative user allowed to bill
    pub clerk: User,
    pub catalog: Catalog,
    pub currency: Currency,
}

impl TestHospital {
    /// A hospital with default settings
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn builder() -> TestHospitalBuilder {
        TestHospitalBuilder::default()
    }

    pub async fn admit(&self, patient: Patient) -> Patient {
        self.patients
            .save_patient(&patient)
            .await
            .expect("in-memory patient registry accepts writes");
        patient
    }

    pub async fn hire(&self, user: User) -> User {
        self.staff
            .save_user(&user)
            .await
            .expect("in-memory staff directory accepts writes");
        user
    }

    pub async fn stock(&self, item: CatalogItem) -> CatalogItem {
        self.inventory.upsert(item.clone()).await;
        item
    }

    /// Starts an order request from the seeded doctor
    pub fn order_for(&self, patient_id: PatientId) -> OrderRequestBuilder {
        OrderRequestBuilder::new(patient_id, self.doctor.id)
    }

    /// Creates a single-line diagnostic order (blood count × `quantity`)
    pub async fn diagnostic_order(&self, patient_id: PatientId, quantity: u32) -> Result<Order, OrderError> {
        let request = self
            .order_for(patient_id)
            .diagnostic(self.catalog.blood_count.id, quantity)
            .build();
        self.aggregator.create_order(request).await
    }

    /// Bills an order as the seeded clerk
    pub async fn bill(&self, number: OrderNumber) -> Result<Invoice, BillingError> {
        self.billing.bill_order(number, self.clerk.id).await
    }

    pub fn money(&self, units: i64) -> Money {
        Money::from_units(units, self.currency)
    }
}
