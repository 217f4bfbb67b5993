use axum::{
    extract::{Path, State},
    response::Html,
    Extension,
};
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

use crate::handlers::bookings::{fetch_reservation, reservation_breakdown};
use crate::models::ReservationStatus;
use crate::services::documents::{render_invoice, render_voucher};
use crate::services::metrics::record_action;
use crate::AppState;

/// Printable voucher. Issued for confirmed bookings only.
///
/// GET /api/bookings/:id/voucher
pub async fn voucher(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let reservation = fetch_reservation(&state, &id, &request_id)
        .await
        .inspect_err(|_| record_action("voucher", false))?;

    if reservation.status() != ReservationStatus::Confirmed {
        record_action("voucher", false);
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Vouchers are only issued for confirmed bookings; {} is {}",
            reservation.display_reference(),
            reservation.status().as_str()
        )));
    }

    let html = render_voucher(&reservation);
    record_action("voucher", html.is_ok());

    Ok(Html(html?))
}

/// Printable invoice for the booking agency.
///
/// GET /api/bookings/:id/invoice
pub async fn invoice(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let reservation = fetch_reservation(&state, &id, &request_id)
        .await
        .inspect_err(|_| record_action("invoice", false))?;
    let breakdown = reservation_breakdown(&reservation);

    let html = render_invoice(&reservation, &breakdown);
    record_action("invoice", html.is_ok());

    Ok(Html(html?))
}
