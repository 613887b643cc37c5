//! Billing and copayment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{CalendarYear, PatientId};
use domain_orders::OrderNumber;

use crate::auth::Claims;
use crate::dto::billing::{CopaymentStatusResponse, InvoiceResponse};
use crate::{error::ApiError, AppState};

/// Bills an order and returns its invoice
pub async fn bill_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(number): Path<String>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let number: OrderNumber = number.parse()?;
    let invoice = state.billing.bill_order(number, claims.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(invoice.into())))
}

/// Gets the invoice of a billed order
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(number): Path<String>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let number: OrderNumber = number.parse()?;
    let invoice = state.billing.invoice_for(number, claims.user_id()?).await?;
    Ok(Json(invoice.into()))
}

/// Year-to-date copayments and remaining headroom of a patient
pub async fn copayment_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((patient_id, year)): Path<(Uuid, i32)>,
) -> Result<Json<CopaymentStatusResponse>, ApiError> {
    state.billing.authorize_ledger_read(claims.user_id()?).await?;
    let year = CalendarYear::new(year).map_err(|e| ApiError::Validation(e.to_string()))?;

    let calculator = state.billing.calculator();
    let (accumulated, remaining) = calculator
        .annual_status(PatientId::from_uuid(patient_id), year)
        .await?;

    Ok(Json(CopaymentStatusResponse::new(
        patient_id,
        year.value(),
        accumulated,
        remaining,
        calculator.policy().max_annual_copayment(),
    )))
}
