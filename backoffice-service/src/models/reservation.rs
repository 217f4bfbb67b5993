//! Reservation records as returned by the booking backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pricing::{parse_amount, MarkupApplied, MarkupKind};

/// Reservation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Failed,
    OnRequest,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Failed => "failed",
            ReservationStatus::OnRequest => "on_request",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" | "booked" => ReservationStatus::Confirmed,
            "cancelled" | "canceled" => ReservationStatus::Cancelled,
            "failed" | "rejected" => ReservationStatus::Failed,
            "on_request" | "onrequest" => ReservationStatus::OnRequest,
            _ => ReservationStatus::Pending,
        }
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    pub fn is_repriceable(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Pending | ReservationStatus::Confirmed | ReservationStatus::OnRequest
        )
    }
}

/// Currency-tagged amount with a loosely typed value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoneyValue {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub currency: String,
}

/// Markup as the backend sends it: `{ "type": "fixed" | "percentage", "value": .. }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMarkup {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

impl RawMarkup {
    pub fn to_markup(&self) -> MarkupApplied {
        MarkupApplied {
            kind: MarkupKind::from_string(&self.kind),
            value: parse_amount(&self.value),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDetails {
    #[serde(default)]
    pub original_price: MoneyValue,
    #[serde(default)]
    pub price: MoneyValue,
    #[serde(default)]
    pub markup_applied: Option<RawMarkup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInfo {
    #[serde(default)]
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    pub board: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: Option<String>,
}

impl Guest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyInfo {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Reservation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub reference: Option<String>,
    pub supplier_reference: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub hotel: HotelInfo,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_rooms")]
    pub rooms: u32,
    #[serde(default)]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub lead_guest: Guest,
    pub agency: Option<AgencyInfo>,
    pub supplier: Option<String>,
    #[serde(default)]
    pub price_details: PriceDetails,
    /// Commission tracked alongside the reservation; absent means zero.
    #[serde(default)]
    pub commission: Value,
    pub cancellation_policy: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

fn default_rooms() -> u32 {
    1
}

impl Reservation {
    pub fn status(&self) -> ReservationStatus {
        ReservationStatus::from_string(&self.status)
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }

    /// Display reference: backend reference when present, otherwise the ID.
    pub fn display_reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.id)
    }
}

/// Page of reservations as returned by the backend list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPage {
    #[serde(default)]
    pub data: Vec<Reservation>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

/// Filter parameters for listing reservations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListReservationsFilter {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parsing_is_lenient() {
        assert_eq!(ReservationStatus::from_string("CONFIRMED"), ReservationStatus::Confirmed);
        assert_eq!(ReservationStatus::from_string("canceled"), ReservationStatus::Cancelled);
        assert_eq!(ReservationStatus::from_string("whatever"), ReservationStatus::Pending);
        assert!(!ReservationStatus::Cancelled.is_cancellable());
        assert!(ReservationStatus::Confirmed.is_cancellable());
    }

    #[test]
    fn reservation_deserializes_with_sparse_fields() {
        let raw = json!({
            "id": "r-1",
            "status": "confirmed",
            "checkIn": "2026-11-01",
            "checkOut": "2026-11-04",
            "priceDetails": {
                "originalPrice": { "value": "100.00", "currency": "EUR" },
                "price": { "value": 115, "currency": "EUR" }
            }
        });

        let reservation: Reservation = serde_json::from_value(raw).unwrap();

        assert_eq!(reservation.status(), ReservationStatus::Confirmed);
        assert_eq!(reservation.nights(), 3);
        assert_eq!(reservation.rooms, 1);
        assert_eq!(reservation.display_reference(), "r-1");
        assert!(reservation.price_details.markup_applied.is_none());
        assert!(reservation.commission.is_null());
    }
}
