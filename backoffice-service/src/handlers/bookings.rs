//! Booking list, overview, cancellation and price editing.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

use crate::dtos::{
    BookingDetail, BookingListResponse, BookingSummary, CancelRequest, CancelResponse,
    ListBookingsQuery, PriceEditRequest, PriceResponse,
};
use crate::models::{Cancellation, PriceUpdate, Reservation};
use crate::pricing::{
    derive_breakdown, parse_amount, reprice, MarkupApplied, PriceBreakdown, PriceInputs,
};
use crate::services::metrics::{record_action, PRICE_DIVERGENCE_TOTAL};
use crate::utils::{ValidatedJson, ValidatedQuery};
use crate::AppState;

/// Breakdown for a fetched reservation. The backend does not expose a
/// discount, so it is taken as zero and any mismatch is flagged.
pub(crate) fn reservation_breakdown(reservation: &Reservation) -> PriceBreakdown {
    let commission = parse_amount(&reservation.commission);
    let breakdown = derive_breakdown(&PriceInputs::from_price_details(
        &reservation.price_details,
        commission,
        Decimal::ZERO,
    ));

    if breakdown.diverges_from_quoted {
        PRICE_DIVERGENCE_TOTAL
            .with_label_values(&[breakdown.currency.as_str()])
            .inc();
        tracing::debug!(
            reservation_id = %reservation.id,
            derived = %breakdown.selling_price,
            quoted = ?breakdown.quoted_selling_price,
            "Derived selling price differs from quoted"
        );
    }

    breakdown
}

pub(crate) async fn fetch_reservation(
    state: &AppState,
    id: &str,
    request_id: &str,
) -> Result<Reservation, AppError> {
    let result = state.backend.get_reservation(id, Some(request_id)).await;
    record_action("view", result.is_ok());
    result
}

/// List bookings.
///
/// GET /api/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    ValidatedQuery(query): ValidatedQuery<ListBookingsQuery>,
) -> Result<Json<BookingListResponse>, AppError> {
    let filter = query.to_filter();

    let result = state
        .backend
        .list_reservations(&filter, Some(&request_id))
        .await;
    record_action("list", result.is_ok());
    let page = result?;

    let data: Vec<BookingSummary> = page
        .data
        .iter()
        .map(|reservation| BookingSummary::new(reservation, reservation_breakdown(reservation)))
        .collect();

    tracing::info!(rows = data.len(), total = page.total, "Listed bookings");

    Ok(Json(BookingListResponse {
        data,
        total: page.total,
        page: page.page,
        page_size: if page.page_size == 0 {
            filter.page_size
        } else {
            page.page_size
        },
    }))
}

/// Booking overview.
///
/// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetail>, AppError> {
    let reservation = fetch_reservation(&state, &id, &request_id).await?;
    let breakdown = reservation_breakdown(&reservation);

    Ok(Json(BookingDetail::new(&reservation, breakdown)))
}

/// Cancel a booking.
///
/// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CancelRequest>,
) -> Result<Json<CancelResponse>, AppError> {
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(AppError::field_invalid(
            "reason",
            "required",
            "Reason must be between 1 and 500 characters",
        ));
    }

    let reservation = fetch_reservation(&state, &id, &request_id).await?;
    let status = reservation.status();
    if !status.is_cancellable() {
        record_action("cancel", false);
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Booking {} is {} and cannot be cancelled",
            reservation.display_reference(),
            status.as_str()
        )));
    }

    let result = state
        .backend
        .cancel_reservation(
            &id,
            &Cancellation {
                reason: reason.to_string(),
            },
            Some(&request_id),
        )
        .await;
    record_action("cancel", result.is_ok());
    let cancelled = result?;

    tracing::info!(
        reservation_id = %id,
        previous_status = status.as_str(),
        "Booking cancelled"
    );

    Ok(Json(CancelResponse {
        id: cancelled.id.clone(),
        status: cancelled.status(),
        message: format!("Booking {} cancelled", cancelled.display_reference()),
    }))
}

async fn edited_breakdown(
    state: &AppState,
    id: &str,
    request_id: &str,
    req: &PriceEditRequest,
) -> Result<PriceBreakdown, AppError> {
    let reservation = fetch_reservation(state, id, request_id).await?;
    let status = reservation.status();
    if !status.is_repriceable() {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Booking {} is {} and cannot be repriced",
            reservation.display_reference(),
            status.as_str()
        )));
    }

    Ok(reprice(&reservation_breakdown(&reservation), req.to_edit()))
}

/// Recompute the breakdown for an edit without saving it.
///
/// POST /api/bookings/:id/price/preview
pub async fn preview_price(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PriceEditRequest>,
) -> Result<Json<PriceResponse>, AppError> {
    let breakdown = edited_breakdown(&state, &id, &request_id, &req).await?;

    Ok(Json(PriceResponse {
        id,
        applied: false,
        breakdown,
    }))
}

/// Apply a price edit through the backend.
///
/// PUT /api/bookings/:id/price
pub async fn update_price(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PriceEditRequest>,
) -> Result<Json<PriceResponse>, AppError> {
    let edited = match edited_breakdown(&state, &id, &request_id, &req).await {
        Ok(edited) => edited,
        Err(e) => {
            record_action("reprice", false);
            return Err(e);
        }
    };

    let markup = edited
        .markup_applied
        .unwrap_or_else(|| MarkupApplied::fixed(edited.markup));
    let update = PriceUpdate {
        markup_applied: markup.into(),
        commission: edited.commission,
        discount: edited.discount,
        selling_price: edited.selling_price,
        currency: edited.currency.clone(),
    };

    let result = state
        .backend
        .update_price(&id, &update, Some(&request_id))
        .await;
    record_action("reprice", result.is_ok());
    result?;

    tracing::info!(
        reservation_id = %id,
        selling_price = %edited.selling_price,
        currency = %edited.currency,
        "Booking repriced"
    );

    // The applied selling price is now the quoted one.
    let breakdown = derive_breakdown(&PriceInputs {
        currency: edited.currency,
        supplier_price: edited.supplier_price,
        quoted_selling_price: Some(edited.selling_price),
        markup: Some(markup),
        commission: edited.commission,
        discount: edited.discount,
    });

    Ok(Json(PriceResponse {
        id,
        applied: true,
        breakdown,
    }))
}
