//! Order handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::PatientId;
use domain_orders::OrderNumber;
use domain_patient::{AccessControl, Permission};

use crate::auth::Claims;
use crate::dto::orders::{CreateOrderBody, OrderResponse};
use crate::{error::ApiError, AppState};

/// Creates an order on behalf of the calling doctor
pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    body.validate()?;
    let doctor_id = claims.user_id()?;

    let order = state.orders.create_order(body.into_request(doctor_id)).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Gets an order by its six-digit number
pub async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(number): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    AccessControl::ensure(claims.role, Permission::ORDERS_READ)?;
    let number: OrderNumber = number.parse()?;

    let order = state.orders.find_order(number).await?;
    Ok(Json(order.into()))
}

/// Lists a patient's orders, oldest first
pub async fn list_patient_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    AccessControl::ensure(claims.role, Permission::ORDERS_READ)?;

    let orders = state.orders.orders_for_patient(PatientId::from_uuid(patient_id)).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
