//! Order creation
//!
//! [`OrderAggregator::create_order`] runs the whole flow: resolve the
//! patient and the ordering doctor, check access, validate the lines, read
//! catalog prices, then persist the order under a freshly allocated number
//! together with its entry in the patient's medical record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::{Currency, PatientId, SharedClock, Timezone, UserId};
use domain_patient::{AccessControl, AccessError, PatientPort, Permission, RecordEntry, StaffPort, User};

use crate::allocator::OrderNumberAllocator;
use crate::error::OrderError;
use crate::lines::OrderLineRequest;
use crate::order::{Order, OrderCategory, OrderDraft};
use crate::order_number::OrderNumber;
use crate::ports::{InventoryPort, OrderStore};

/// Settings the aggregator needs from configuration
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    /// Currency every catalog price must be quoted in
    pub currency: Currency,
    /// Timezone deciding the order's calendar date
    pub timezone: Timezone,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::COP,
            timezone: Timezone::default(),
        }
    }
}

/// A doctor's request to create an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub patient_id: PatientId,
    pub doctor_id: UserId,
    #[serde(default)]
    pub diagnosis: Option<String>,
    pub lines: Vec<OrderLineRequest>,
}

/// Creates orders
pub struct OrderAggregator {
    patients: Arc<dyn PatientPort>,
    staff: Arc<dyn StaffPort>,
    inventory: Arc<dyn InventoryPort>,
    orders: Arc<dyn OrderStore>,
    allocator: Arc<OrderNumberAllocator>,
    clock: SharedClock,
    config: OrderingConfig,
}

impl OrderAggregator {
    pub fn new(
        patients: Arc<dyn PatientPort>,
        staff: Arc<dyn StaffPort>,
        inventory: Arc<dyn InventoryPort>,
        orders: Arc<dyn OrderStore>,
        allocator: Arc<OrderNumberAllocator>,
        clock: SharedClock,
        config: OrderingConfig,
    ) -> Self {
        Self {
            patients,
            staff,
            inventory,
            orders,
            allocator,
            clock,
            config,
        }
    }

    /// Creates, prices, numbers and persists an order
    ///
    /// On success the order is stored and a matching entry has been
    /// appended to the patient's medical record. On any error neither is
    /// stored, so the request can be retried without duplicating the order.
    #[instrument(
        skip(self, request),
        fields(patient_id = %request.patient_id, doctor_id = %request.doctor_id, lines = request.lines.len())
    )]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        let patient = self.patients.find_patient(request.patient_id).await?;
        let doctor = self.staff.find_user(request.doctor_id).await?;
        Self::ensure_can_order(&doctor)?;

        let category = OrderCategory::classify(&request.lines)?;
        for (index, line) in request.lines.iter().enumerate() {
            line.validate(index as u32 + 1)?;
        }

        let mut priced = Vec::with_capacity(request.lines.len());
        for (index, line) in request.lines.into_iter().enumerate() {
            let item = self.inventory.find_item(line.kind(), line.item_id()).await?;
            if item.unit_cost.currency() != self.config.currency {
                return Err(OrderError::validation(format!(
                    "{} '{}' is priced in {}, expected {}",
                    item.kind, item.name, item.unit_cost.currency(), self.config.currency
                )));
            }
            priced.push(line.price(index as u32 + 1, item.unit_cost));
        }

        let now = self.clock.now();
        let created_on = self.config.timezone.local_date(now);
        let draft = OrderDraft::from_priced(
            patient.id,
            doctor.id,
            created_on,
            request.diagnosis,
            category,
            priced,
            self.config.currency,
        )?;

        let order = self
            .allocator
            .allocate_and_insert(draft, now, |order| {
                RecordEntry::new(order.patient_id, order.doctor_id, order.created_on, order.record_summary())
                    .map(|entry| entry.for_order(order.number.to_string()))
                    .map_err(|e| OrderError::validation(e.to_string()))
            })
            .await?;

        info!(
            order_number = %order.number,
            category = %order.category,
            total_cost = %order.total_cost,
            "order created"
        );
        Ok(order)
    }

    /// Retrieves a stored order
    #[instrument(skip(self))]
    pub async fn find_order(&self, number: OrderNumber) -> Result<Order, OrderError> {
        Ok(self.orders.find_by_number(number).await?)
    }

    /// All orders of a patient, oldest first; `NotFound` for an unknown patient
    pub async fn orders_for_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, OrderError> {
        self.patients.find_patient(patient_id).await?;
        Ok(self.orders.find_by_patient(patient_id).await?)
    }

    fn ensure_can_order(doctor: &User) -> Result<(), AccessError> {
        if !doctor.active {
            return Err(AccessError::InactiveUser(doctor.username.clone()));
        }
        if !doctor.role.is_clinician() {
            return Err(AccessError::ClinicianRequired(doctor.role));
        }
        AccessControl::ensure(doctor.role, Permission::ORDERS_CREATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;
    use crate::order_number::OrderNumberSpace;
    use crate::ports::mock::{MockInventoryPort, MockOrderStore};
    use chrono::{NaiveDate, TimeZone, Utc};
    use core_kernel::{FixedClock, InventoryItemId, Money};
    use domain_patient::{MedicalRecordPort, MockMedicalRecordPort, MockPatientPort, MockStaffPort, Patient, Role};

    fn cop(units: i64) -> Money {
        Money::from_units(units, Currency::COP)
    }

    struct Fixture {
        aggregator: OrderAggregator,
        records: Arc<MockMedicalRecordPort>,
        store: Arc<MockOrderStore>,
        patient: Patient,
        doctor: User,
        nurse: User,
        amoxicillin: CatalogItem,
        suture: CatalogItem,
        xray: CatalogItem,
    }

    async fn fixture() -> Fixture {
        let patient = Patient::new("1020304050", "Ana Gómez", NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()).unwrap();
        let doctor = User::new("dr.perez", "Laura Pérez", Role::Doctor);
        let nurse = User::new("n.rios", "Camilo Ríos", Role::Nurse);
        let amoxicillin = CatalogItem::medication("Amoxicillin 500mg", cop(1_200));
        let suture = CatalogItem::procedure("Wound suture", cop(85_000));
        let xray = CatalogItem::diagnostic("Chest X-ray", cop(60_000));

        let records = Arc::new(MockMedicalRecordPort::new());
        let store = Arc::new(MockOrderStore::with_records(records.clone()));
        let allocator = Arc::new(OrderNumberAllocator::new(store.clone(), OrderNumberSpace::default()));
        // 03:00 UTC on Mar 1st is still Feb 29th in Bogotá
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap()));

        let aggregator = OrderAggregator::new(
            Arc::new(MockPatientPort::with_patients(vec![patient.clone()]).await),
            Arc::new(MockStaffPort::with_users(vec![doctor.clone(), nurse.clone()]).await),
            Arc::new(MockInventoryPort::with_items(vec![amoxicillin.clone(), suture.clone(), xray.clone()]).await),
            store.clone(),
            allocator,
            clock,
            OrderingConfig::default(),
        );

        Fixture { aggregator, records, store, patient, doctor, nurse, amoxicillin, suture, xray }
    }

    fn request(f: &Fixture, lines: Vec<OrderLineRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            patient_id: f.patient.id,
            doctor_id: f.doctor.id,
            diagnosis: Some("S61.4 Open wound of hand".into()),
            lines,
        }
    }

    #[tokio::test]
    async fn test_treatment_order_total_and_record_entry() {
        let f = fixture().await;
        let order = f
            .aggregator
            .create_order(request(&f, vec![
                OrderLineRequest::medication(f.amoxicillin.id, "500mg", "every 8h", 7, 21),
                OrderLineRequest::procedure(f.suture.id, 1),
            ]))
            .await
            .unwrap();

        assert_eq!(order.number.to_string(), "000001");
        assert_eq!(order.category, OrderCategory::Treatment);
        assert_eq!(order.total_cost, cop(21 * 1_200 + 85_000));
        assert_eq!(order.created_on, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(order.medications[0].line_number, 1);
        assert_eq!(order.procedures[0].line_number, 2);

        let entries = f.records.entries_for(f.patient.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].order_number.as_deref(), Some("000001"));
        assert_eq!(entries[0].author_id, f.doctor.id);
    }

    #[tokio::test]
    async fn test_mixed_diagnostic_and_treatment_rejected() {
        let f = fixture().await;
        let result = f
            .aggregator
            .create_order(request(&f, vec![
                OrderLineRequest::diagnostic(f.xray.id, 1),
                OrderLineRequest::procedure(f.suture.id, 1),
            ]))
            .await;

        assert!(matches!(result, Err(OrderError::Validation(_))));
        assert_eq!(f.store.count().await.unwrap(), 0);
        assert_eq!(f.records.len().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let f = fixture().await;
        let mut req = request(&f, vec![OrderLineRequest::diagnostic(f.xray.id, 1)]);
        req.patient_id = PatientId::new();

        let result = f.aggregator.create_order(req).await;
        assert!(matches!(result, Err(OrderError::NotFound { ref entity, .. }) if entity == "Patient"));
    }

    #[tokio::test]
    async fn test_nurse_cannot_order() {
        let f = fixture().await;
        let mut req = request(&f, vec![OrderLineRequest::diagnostic(f.xray.id, 1)]);
        req.doctor_id = f.nurse.id;

        let result = f.aggregator.create_order(req).await;
        assert!(matches!(result, Err(OrderError::Access(AccessError::ClinicianRequired(Role::Nurse)))));
    }

    #[tokio::test]
    async fn test_item_of_wrong_kind_is_not_found() {
        let f = fixture().await;
        // The X-ray is a diagnostic aid, not a procedure
        let result = f
            .aggregator
            .create_order(request(&f, vec![OrderLineRequest::procedure(f.xray.id, 1)]))
            .await;
        assert!(matches!(result, Err(OrderError::NotFound { ref entity, .. }) if entity == "Procedure"));

        let result = f
            .aggregator
            .create_order(request(&f, vec![OrderLineRequest::diagnostic(InventoryItemId::new(), 1)]))
            .await;
        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_record_failure_stores_nothing_and_retry_succeeds() {
        let f = fixture().await;
        let lines = || vec![OrderLineRequest::diagnostic(f.xray.id, 2)];
        f.records.set_fail_appends(true);

        let result = f.aggregator.create_order(request(&f, lines())).await;
        assert!(matches!(result, Err(OrderError::Port(_))));
        assert_eq!(f.store.count().await.unwrap(), 0);
        assert!(f.aggregator.find_order("000001".parse().unwrap()).await.is_err());

        f.records.set_fail_appends(false);
        let order = f.aggregator.create_order(request(&f, lines())).await.unwrap();
        assert_eq!(order.number.to_string(), "000001");
        assert_eq!(order.total_cost, cop(120_000));
        assert_eq!(f.store.count().await.unwrap(), 1);
        assert_eq!(f.records.entries_for(f.patient.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_orders_for_unknown_patient_is_not_found() {
        let f = fixture().await;
        let result = f.aggregator.orders_for_patient(PatientId::new()).await;
        assert!(matches!(result, Err(OrderError::NotFound { ref entity, .. }) if entity == "Patient"));
    }

    #[tokio::test]
    async fn test_concurrent_orders_get_unique_numbers() {
        let f = Arc::new(fixture().await);

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let f = f.clone();
                tokio::spawn(async move {
                    let req = request(&f, vec![OrderLineRequest::diagnostic(f.xray.id, 1)]);
                    f.aggregator.create_order(req).await
                })
            })
            .collect();

        let mut numbers = std::collections::HashSet::new();
        for handle in handles {
            let order = handle.await.unwrap().unwrap();
            assert!(numbers.insert(order.number));
        }

        assert_eq!(numbers.len(), 25);
        assert_eq!(f.aggregator.orders_for_patient(f.patient.id).await.unwrap().len(), 25);
    }
}
