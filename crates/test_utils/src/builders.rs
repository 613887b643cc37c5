//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use chrono::{NaiveDate, Utc};
use fake::faker::name::en::Name;
use fake::Fake;

use core_kernel::{InventoryItemId, Money, PatientId, UserId};
use domain_orders::{CreateOrderRequest, Order, OrderCategory, OrderLineRequest, OrderNumber};
use domain_patient::{InsurancePolicy, Patient};

use crate::fixtures::{cop, PatientFixtures, TemporalFixtures};

/// Builder for patients
pub struct PatientBuilder {
    document_number: String,
    full_name: String,
    date_of_birth: NaiveDate,
    insurance: Option<InsurancePolicy>,
}

impl Default for PatientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientBuilder {
    /// An uninsured adult with a random name and document number
    pub fn new() -> Self {
        Self {
            document_number: (10_000_000u64..9_999_999_999u64).fake::<u64>().to_string(),
            full_name: Name().fake(),
            date_of_birth: TemporalFixtures::adult_birth_date(),
            insurance: None,
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document_number = document.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    pub fn born_on(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = date;
        self
    }

    /// Attaches the standard active policy
    pub fn insured(self) -> Self {
        self.with_policy(PatientFixtures::active_policy())
    }

    pub fn with_policy(mut self, policy: InsurancePolicy) -> Self {
        self.insurance = Some(policy);
        self
    }

    /// Attaches a policy whose last covered day is `expiration`
    pub fn insured_until(self, expiration: NaiveDate) -> Self {
        self.with_policy(InsurancePolicy::new("Sura EPS", "SUR-TEST", expiration))
    }

    pub fn build(self) -> Patient {
        let mut patient = Patient::new(self.document_number, self.full_name, self.date_of_birth)
            .expect("builder produces a valid patient");
        patient.insurance = self.insurance;
        patient
    }
}

/// Builder for order creation requests
pub struct OrderRequestBuilder {
    patient_id: PatientId,
    doctor_id: UserId,
    diagnosis: Option<String>,
    lines: Vec<OrderLineRequest>,
}

impl OrderRequestBuilder {
    pub fn new(patient_id: PatientId, doctor_id: UserId) -> Self {
        Self {
            patient_id,
            doctor_id,
            diagnosis: None,
            lines: Vec::new(),
        }
    }

    pub fn diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.diagnosis = Some(diagnosis.into());
        self
    }

    /// Adds a medication line with a fixed dosage regimen
    pub fn medication(mut self, item_id: InventoryItemId, quantity: u32) -> Self {
        self.lines
            .push(OrderLineRequest::medication(item_id, "500 mg", "every 8 hours", 7, quantity));
        self
    }

    pub fn procedure(mut self, item_id: InventoryItemId, quantity: u32) -> Self {
        self.lines.push(OrderLineRequest::procedure(item_id, quantity));
        self
    }

    pub fn diagnostic(mut self, item_id: InventoryItemId, quantity: u32) -> Self {
        self.lines.push(OrderLineRequest::diagnostic(item_id, quantity));
        self
    }

    /// Adds an arbitrary line
    pub fn line(mut self, line: OrderLineRequest) -> Self {
        self.lines.push(line);
        self
    }

    pub fn build(self) -> CreateOrderRequest {
        CreateOrderRequest {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            diagnosis: self.diagnosis,
            lines: self.lines,
        }
    }
}

/// Builder for already-persisted orders, for billing tests that bypass
/// order creation
pub struct StoredOrderBuilder {
    number: u32,
    patient_id: PatientId,
    doctor_id: UserId,
    created_on: NaiveDate,
    category: OrderCategory,
    total_cost: Money,
}

impl StoredOrderBuilder {
    pub fn new(number: u32, patient_id: PatientId) -> Self {
        Self {
            number,
            patient_id,
            doctor_id: UserId::new(),
            created_on: TemporalFixtures::date(2024, 9, 10),
            category: OrderCategory::Diagnostic,
            total_cost: cop(100_000),
        }
    }

    pub fn doctor(mut self, doctor_id: UserId) -> Self {
        self.doctor_id = doctor_id;
        self
    }

    pub fn created_on(mut self, date: NaiveDate) -> Self {
        self.created_on = date;
        self
    }

    pub fn treatment(mut self) -> Self {
        self.category = OrderCategory::Treatment;
        self
    }

    pub fn total(mut self, total: Money) -> Self {
        self.total_cost = total;
        self
    }

    pub fn build(self) -> Order {
        Order {
            number: OrderNumber::new(self.number).expect("builder number within range"),
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            created_on: self.created_on,
            created_at: Utc::now(),
            diagnosis: None,
            category: self.category,
            medications: Vec::new(),
            procedures: Vec::new(),
            diagnostics: Vec::new(),
            total_cost: self.total_cost,
        }
    }
}
