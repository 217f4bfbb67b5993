//! Public agency registration.

use axum::{extract::State, http::StatusCode, Extension, Json};
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

use crate::dtos::{RegisterAgencyRequest, RegistrationResponse};
use crate::services::captcha::CaptchaChallenge;
use crate::services::metrics::REGISTRATIONS_TOTAL;
use crate::utils::ValidatedJson;
use crate::AppState;

/// Issue a captcha challenge for the registration form.
///
/// GET /api/registrations/captcha
pub async fn captcha(State(state): State<AppState>) -> Json<CaptchaChallenge> {
    Json(state.captcha.issue())
}

/// Register a new agency.
///
/// POST /api/registrations
pub async fn register(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    ValidatedJson(req): ValidatedJson<RegisterAgencyRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    if let Err(e) = state.captcha.verify(req.captcha_id, &req.captcha_answer) {
        REGISTRATIONS_TOTAL.with_label_values(&["captcha_failed"]).inc();
        return Err(e);
    }

    let registration = req.into_registration();
    let created = match state
        .backend
        .register_agency(&registration, Some(&request_id))
        .await
    {
        Ok(created) => created,
        Err(e) => {
            REGISTRATIONS_TOTAL.with_label_values(&["rejected"]).inc();
            tracing::warn!(error = %e, country = %registration.country_code, "Agency registration failed");
            return Err(e);
        }
    };

    REGISTRATIONS_TOTAL.with_label_values(&["accepted"]).inc();
    tracing::info!(
        agency_id = %created.id,
        country = %registration.country_code,
        "Agency registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            agency_id: created.id,
            status: created
                .status
                .unwrap_or_else(|| "pending_approval".to_string()),
            message: "Registration received. Your account will be reviewed shortly.".to_string(),
        }),
    ))
}
