//! Manual-reservation wizard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use validator::Validate;

use crate::dtos::{
    GuestsStep, HotelStep, ManualReservationRequest, ManualReservationResponse, PricingStep,
    QuoteResponse, StayStep, StepValidationResponse, WizardStep,
};
use crate::pricing::derive_breakdown;
use crate::services::metrics::record_action;
use crate::utils::ValidatedJson;
use crate::AppState;

fn validate_as<T: DeserializeOwned + Validate>(body: Value) -> Result<(), AppError> {
    let step: T = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)))?;
    step.validate()?;
    Ok(())
}

/// Validate one wizard step.
///
/// POST /api/manual-reservations/steps/:step
pub async fn validate_step(
    Path(step): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<StepValidationResponse>, AppError> {
    let step = WizardStep::parse(&step)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Unknown wizard step '{}'", step)))?;

    match step {
        WizardStep::Hotel => validate_as::<HotelStep>(body)?,
        WizardStep::Stay => validate_as::<StayStep>(body)?,
        WizardStep::Guests => validate_as::<GuestsStep>(body)?,
        WizardStep::Pricing => validate_as::<PricingStep>(body)?,
    }

    Ok(Json(StepValidationResponse {
        step,
        valid: true,
        next_step: step.next(),
    }))
}

/// Breakdown for the pricing step.
///
/// POST /api/manual-reservations/quote
pub async fn quote(
    ValidatedJson(pricing): ValidatedJson<PricingStep>,
) -> Result<Json<QuoteResponse>, AppError> {
    Ok(Json(QuoteResponse {
        breakdown: derive_breakdown(&pricing.to_inputs()),
    }))
}

/// Submit a complete manual reservation.
///
/// POST /api/manual-reservations
pub async fn create_manual_reservation(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    ValidatedJson(req): ValidatedJson<ManualReservationRequest>,
) -> Result<(StatusCode, Json<ManualReservationResponse>), AppError> {
    let breakdown = derive_breakdown(&req.pricing.to_inputs());
    let reservation = req.to_new_reservation(&breakdown);

    let result = state
        .backend
        .create_reservation(&reservation, Some(&request_id))
        .await;
    record_action("manual_create", result.is_ok());
    let created = result?;

    tracing::info!(
        reservation_id = %created.id,
        supplier = %reservation.supplier,
        selling_price = %breakdown.selling_price,
        currency = %breakdown.currency,
        "Manual reservation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ManualReservationResponse {
            id: created.id.clone(),
            reference: created.display_reference().to_string(),
            status: created.status(),
            breakdown,
        }),
    ))
}
