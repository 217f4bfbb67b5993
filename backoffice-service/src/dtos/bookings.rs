use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{HotelInfo, ListReservationsFilter, Reservation, ReservationStatus};
use crate::pricing::{MarkupApplied, MarkupKind, PriceBreakdown, PriceEdit};
use crate::utils::non_negative;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListBookingsQuery {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: Option<u32>,
    pub status: Option<ReservationStatus>,
    #[validate(length(max = 100, message = "Search term is too long"))]
    pub search: Option<String>,
}

impl ListBookingsQuery {
    pub fn to_filter(&self) -> ListReservationsFilter {
        ListReservationsFilter {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            status: self.status,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// One row of the booking list.
#[derive(Debug, Serialize)]
pub struct BookingSummary {
    pub id: String,
    pub reference: String,
    pub status: ReservationStatus,
    pub hotel_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub lead_guest: String,
    pub agency_name: Option<String>,
    pub breakdown: PriceBreakdown,
}

impl BookingSummary {
    pub fn new(reservation: &Reservation, breakdown: PriceBreakdown) -> Self {
        Self {
            id: reservation.id.clone(),
            reference: reservation.display_reference().to_string(),
            status: reservation.status(),
            hotel_name: reservation.hotel.name.clone(),
            check_in: reservation.check_in,
            check_out: reservation.check_out,
            nights: reservation.nights(),
            lead_guest: reservation.lead_guest.full_name(),
            agency_name: reservation.agency.as_ref().map(|a| a.name.clone()),
            breakdown,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub data: Vec<BookingSummary>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Booking overview.
#[derive(Debug, Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub summary: BookingSummary,
    pub supplier: Option<String>,
    pub supplier_reference: Option<String>,
    pub hotel: HotelInfo,
    pub rooms: u32,
    pub adults: u32,
    pub children: u32,
    pub cancellation_policy: Option<String>,
    pub can_cancel: bool,
    pub can_reprice: bool,
}

impl BookingDetail {
    pub fn new(reservation: &Reservation, breakdown: PriceBreakdown) -> Self {
        let status = reservation.status();
        Self {
            summary: BookingSummary::new(reservation, breakdown),
            supplier: reservation.supplier.clone(),
            supplier_reference: reservation.supplier_reference.clone(),
            hotel: reservation.hotel.clone(),
            rooms: reservation.rooms,
            adults: reservation.adults,
            children: reservation.children,
            cancellation_policy: reservation.cancellation_policy.clone(),
            can_cancel: status.is_cancellable(),
            can_reprice: status.is_repriceable(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub id: String,
    pub status: ReservationStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct MarkupInput {
    #[serde(rename = "type")]
    pub kind: MarkupKind,
    #[validate(custom(function = "non_negative"))]
    pub value: Decimal,
}

impl From<MarkupInput> for MarkupApplied {
    fn from(input: MarkupInput) -> Self {
        MarkupApplied {
            kind: input.kind,
            value: input.value,
        }
    }
}

/// Edited pricing terms. Omitted fields keep their current value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PriceEditRequest {
    #[validate(nested)]
    pub markup: Option<MarkupInput>,
    #[validate(custom(function = "non_negative"))]
    pub commission: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    pub discount: Option<Decimal>,
}

impl PriceEditRequest {
    pub fn to_edit(&self) -> PriceEdit {
        PriceEdit {
            markup: self.markup.map(MarkupApplied::from),
            commission: self.commission,
            discount: self.discount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub id: String,
    pub applied: bool,
    pub breakdown: PriceBreakdown,
}
