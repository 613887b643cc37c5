//! Order DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{PatientId, UserId};
use domain_orders::{
    CreateOrderRequest, DiagnosticLine, MedicationLine, Order, OrderCategory, OrderLineRequest, ProcedureLine,
};

/// Body of `POST /api/v1/orders`; the ordering doctor is the caller
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderBody {
    pub patient_id: Uuid,
    #[validate(length(max = 2000))]
    pub diagnosis: Option<String>,
    #[validate(length(min = 1, message = "an order needs at least one line"))]
    pub lines: Vec<OrderLineRequest>,
}

impl CreateOrderBody {
    pub fn into_request(self, doctor_id: UserId) -> CreateOrderRequest {
        CreateOrderRequest {
            patient_id: PatientId::from_uuid(self.patient_id),
            doctor_id,
            diagnosis: self.diagnosis,
            lines: self.lines,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_number: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub category: OrderCategory,
    pub created_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub diagnosis: Option<String>,
    pub medications: Vec<MedicationLine>,
    pub procedures: Vec<ProcedureLine>,
    pub diagnostics: Vec<DiagnosticLine>,
    pub total_cost: Decimal,
    pub currency: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_number: order.number.to_string(),
            patient_id: *order.patient_id.as_uuid(),
            doctor_id: *order.doctor_id.as_uuid(),
            category: order.category,
            created_on: order.created_on,
            created_at: order.created_at,
            diagnosis: order.diagnosis,
            medications: order.medications,
            procedures: order.procedures,
            diagnostics: order.diagnostics,
            total_cost: order.total_cost.amount(),
            currency: order.total_cost.currency().code().to_string(),
        }
    }
}
