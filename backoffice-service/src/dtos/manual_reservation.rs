//! Manual-reservation wizard payloads.
//!
//! Each step validates on its own so the UI can gate the "next" button; the
//! final submission validates all four again.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::dtos::MarkupInput;
use crate::models::{
    NewReservation, NewReservationGuest, NewReservationHotel, ReservationStatus, WireMoney,
    WirePriceDetails,
};
use crate::pricing::{MarkupApplied, PriceBreakdown, PriceInputs};
use crate::utils::{country_code, currency_code, non_negative, positive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Hotel,
    Stay,
    Guests,
    Pricing,
}

impl WizardStep {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hotel" => Some(WizardStep::Hotel),
            "stay" => Some(WizardStep::Stay),
            "guests" => Some(WizardStep::Guests),
            "pricing" => Some(WizardStep::Pricing),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Hotel => Some(WizardStep::Stay),
            WizardStep::Stay => Some(WizardStep::Guests),
            WizardStep::Guests => Some(WizardStep::Pricing),
            WizardStep::Pricing => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HotelStep {
    #[validate(length(min = 1, max = 200, message = "Hotel name is required"))]
    pub hotel_name: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(custom(function = "country_code"))]
    pub country_code: String,
    #[validate(length(min = 1, max = 100, message = "Supplier is required"))]
    pub supplier: String,
    #[validate(length(max = 100))]
    pub supplier_reference: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub room_type: Option<String>,
    #[validate(length(max = 50))]
    pub board: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_stay_dates", skip_on_field_errors = false))]
pub struct StayStep {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, max = 10, message = "Rooms must be between 1 and 10"))]
    pub rooms: u32,
}

fn validate_stay_dates(stay: &StayStep) -> Result<(), ValidationError> {
    check_stay_dates(stay.check_in, stay.check_out, Utc::now().date_naive())
}

fn check_stay_dates(
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if check_out <= check_in {
        let mut error = ValidationError::new("check_out_before_check_in");
        error.message = Some("Check-out must be after check-in".into());
        return Err(error);
    }
    if check_in < today {
        let mut error = ValidationError::new("check_in_in_past");
        error.message = Some("Check-in cannot be in the past".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GuestsStep {
    #[validate(length(min = 1, max = 100, message = "Lead guest first name is required"))]
    pub lead_first_name: String,
    #[validate(length(min = 1, max = 100, message = "Lead guest last name is required"))]
    pub lead_last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub lead_email: String,
    #[validate(range(min = 1, max = 20, message = "Adults must be between 1 and 20"))]
    pub adults: u32,
    #[serde(default)]
    #[validate(range(max = 10, message = "Children must be between 0 and 10"))]
    pub children: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PricingStep {
    #[validate(custom(function = "positive"))]
    pub supplier_price: Decimal,
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    #[validate(nested)]
    pub markup: MarkupInput,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub commission: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub discount: Decimal,
}

impl PricingStep {
    /// Calculator inputs. A new reservation has no quoted price to compare against.
    pub fn to_inputs(&self) -> PriceInputs {
        PriceInputs {
            currency: self.currency.to_ascii_uppercase(),
            supplier_price: self.supplier_price,
            quoted_selling_price: None,
            markup: Some(MarkupApplied::from(self.markup)),
            commission: self.commission,
            discount: self.discount,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualReservationRequest {
    #[validate(nested)]
    pub hotel: HotelStep,
    #[validate(nested)]
    pub stay: StayStep,
    #[validate(nested)]
    pub guests: GuestsStep,
    #[validate(nested)]
    pub pricing: PricingStep,
    #[validate(length(max = 1000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

impl ManualReservationRequest {
    /// Backend payload, with price details taken from the derived breakdown.
    pub fn to_new_reservation(&self, breakdown: &PriceBreakdown) -> NewReservation {
        let money = |value: Decimal| WireMoney {
            value,
            currency: breakdown.currency.clone(),
        };
        let trimmed = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        NewReservation {
            source: "manual",
            supplier: self.hotel.supplier.trim().to_string(),
            supplier_reference: trimmed(&self.hotel.supplier_reference),
            hotel: NewReservationHotel {
                name: self.hotel.hotel_name.trim().to_string(),
                city: self.hotel.city.trim().to_string(),
                country_code: self.hotel.country_code.to_ascii_uppercase(),
                address: trimmed(&self.hotel.address),
                room_type: trimmed(&self.hotel.room_type),
                board: trimmed(&self.hotel.board),
            },
            check_in: self.stay.check_in,
            check_out: self.stay.check_out,
            rooms: self.stay.rooms,
            adults: self.guests.adults,
            children: self.guests.children,
            lead_guest: NewReservationGuest {
                first_name: self.guests.lead_first_name.trim().to_string(),
                last_name: self.guests.lead_last_name.trim().to_string(),
                email: self.guests.lead_email.trim().to_lowercase(),
            },
            price_details: WirePriceDetails {
                original_price: money(breakdown.supplier_price),
                price: money(breakdown.selling_price),
                markup_applied: MarkupApplied::from(self.pricing.markup).into(),
            },
            commission: breakdown.commission,
            discount: breakdown.discount,
            notes: trimmed(&self.notes),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepValidationResponse {
    pub step: WizardStep,
    pub valid: bool,
    pub next_step: Option<WizardStep>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub breakdown: PriceBreakdown,
}

#[derive(Debug, Serialize)]
pub struct ManualReservationResponse {
    pub id: String,
    pub reference: String,
    pub status: ReservationStatus,
    pub breakdown: PriceBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::derive_breakdown;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn stay_dates() {
        let today = date("2026-10-16");

        assert!(check_stay_dates(date("2026-11-01"), date("2026-11-04"), today).is_ok());
        assert!(check_stay_dates(today, date("2026-10-17"), today).is_ok());
        assert_eq!(
            check_stay_dates(date("2026-11-04"), date("2026-11-04"), today)
                .unwrap_err()
                .code,
            "check_out_before_check_in"
        );
        assert_eq!(
            check_stay_dates(date("2026-10-15"), date("2026-10-18"), today)
                .unwrap_err()
                .code,
            "check_in_in_past"
        );
    }

    #[test]
    fn stay_step_rejects_reversed_dates() {
        let check_in = Utc::now().date_naive() + Duration::days(10);
        let stay = StayStep {
            check_in,
            check_out: check_in - Duration::days(2),
            rooms: 1,
        };
        assert!(stay.validate().is_err());

        let stay = StayStep {
            check_in,
            check_out: check_in + Duration::days(2),
            rooms: 11,
        };
        assert!(stay.validate().is_err());
    }

    #[test]
    fn wizard_order() {
        assert_eq!(WizardStep::Hotel.next(), Some(WizardStep::Stay));
        assert_eq!(WizardStep::Pricing.next(), None);
    }

    #[test]
    fn pricing_step_quote_and_payload() {
        let pricing: PricingStep = serde_json::from_value(json!({
            "supplier_price": 200,
            "currency": "eur",
            "markup": { "type": "percentage", "value": 10 },
            "commission": 10,
            "discount": 5
        }))
        .unwrap();
        assert!(pricing.validate().is_ok());

        let breakdown = derive_breakdown(&pricing.to_inputs());
        assert_eq!(breakdown.currency, "EUR");
        assert_eq!(breakdown.net_price, dec!(220));
        assert_eq!(breakdown.selling_price, dec!(205));
    }

    #[test]
    fn pricing_step_requires_positive_supplier_price() {
        let pricing: PricingStep = serde_json::from_value(json!({
            "supplier_price": 0,
            "currency": "EUR",
            "markup": { "type": "fixed", "value": 10 }
        }))
        .unwrap();

        let errors = pricing.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("supplier_price"));
    }

    #[test]
    fn pricing_step_bounds_markup_value() {
        let pricing: PricingStep = serde_json::from_value(json!({
            "supplier_price": "1000",
            "currency": "EUR",
            "markup": { "type": "percentage", "value": "79228162514264337593543950335" }
        }))
        .unwrap();

        assert!(pricing.validate().is_err());
    }
}
