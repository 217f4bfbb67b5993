//! Payloads sent to the booking backend.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing::MarkupApplied;

/// Markup in the backend's wire shape, with numbers as JSON floats.
#[derive(Debug, Clone, Serialize)]
pub struct WireMarkup {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl From<MarkupApplied> for WireMarkup {
    fn from(markup: MarkupApplied) -> Self {
        Self {
            kind: markup.kind.as_str(),
            value: markup.value,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMoney {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePriceDetails {
    pub original_price: WireMoney,
    pub price: WireMoney,
    pub markup_applied: WireMarkup,
}

/// Price update for an existing reservation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    pub markup_applied: WireMarkup,
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub selling_price: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservationHotel {
    pub name: String,
    pub city: String,
    pub country_code: String,
    pub address: Option<String>,
    pub room_type: Option<String>,
    pub board: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservationGuest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Manually keyed reservation, created outside the supplier booking flow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub source: &'static str,
    pub supplier: String,
    pub supplier_reference: Option<String>,
    pub hotel: NewReservationHotel,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms: u32,
    pub adults: u32,
    pub children: u32,
    pub lead_guest: NewReservationGuest,
    pub price_details: WirePriceDetails,
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    pub notes: Option<String>,
}

/// Agency sign-up forwarded to the backend once captcha and validation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyRegistration {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub city: String,
    pub address: String,
    pub license_number: Option<String>,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_update_serializes_numbers_as_floats() {
        let update = PriceUpdate {
            markup_applied: MarkupApplied::percentage(dec!(12.5)).into(),
            commission: dec!(5),
            discount: dec!(0),
            selling_price: dec!(107.5),
            currency: "EUR".to_string(),
        };

        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["markupApplied"]["type"], "percentage");
        assert_eq!(json["markupApplied"]["value"], 12.5);
        assert_eq!(json["sellingPrice"], 107.5);
        assert_eq!(json["commission"], 5.0);
    }
}
