//! Printable voucher and invoice rendering.

use askama::Template;
use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;

use crate::models::Reservation;
use crate::pricing::PriceBreakdown;

/// Two decimal places, half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Deductions print as negative amounts; zero stays unsigned.
fn deduction(amount: Decimal) -> Decimal {
    if amount.is_zero() {
        Decimal::ZERO
    } else {
        -amount
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

#[derive(Template)]
#[template(path = "voucher.html")]
pub struct VoucherTemplate {
    pub reference: String,
    pub supplier_reference: String,
    pub hotel_name: String,
    pub hotel_address: String,
    pub hotel_phone: String,
    pub room_type: String,
    pub board: String,
    pub check_in: String,
    pub check_out: String,
    pub nights: i64,
    pub rooms: u32,
    pub adults: u32,
    pub children: u32,
    pub lead_guest: String,
    pub agency_name: String,
    pub cancellation_policy: String,
    pub issued_on: String,
}

pub struct InvoiceLine {
    pub label: &'static str,
    pub amount: String,
}

#[derive(Template)]
#[template(path = "invoice.html")]
pub struct InvoiceTemplate {
    pub invoice_number: String,
    pub reference: String,
    pub issued_on: String,
    pub agency_name: String,
    pub agency_address: String,
    pub agency_email: String,
    pub description: String,
    pub lead_guest: String,
    pub currency: String,
    pub lines: Vec<InvoiceLine>,
    pub total: String,
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

pub fn render_voucher(reservation: &Reservation) -> Result<String, AppError> {
    let hotel = &reservation.hotel;
    let hotel_address = [hotel.address.as_deref(), hotel.city.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let template = VoucherTemplate {
        reference: reservation.display_reference().to_string(),
        supplier_reference: or_dash(reservation.supplier_reference.as_deref()),
        hotel_name: hotel.name.clone(),
        hotel_address: or_dash(Some(hotel_address.as_str())),
        hotel_phone: or_dash(hotel.phone.as_deref()),
        room_type: or_dash(hotel.room_type.as_deref()),
        board: or_dash(hotel.board.as_deref()),
        check_in: format_date(reservation.check_in),
        check_out: format_date(reservation.check_out),
        nights: reservation.nights(),
        rooms: reservation.rooms,
        adults: reservation.adults,
        children: reservation.children,
        lead_guest: reservation.lead_guest.full_name(),
        agency_name: or_dash(reservation.agency.as_ref().map(|a| a.name.as_str())),
        cancellation_policy: or_dash(reservation.cancellation_policy.as_deref()),
        issued_on: format_date(Utc::now().date_naive()),
    };

    template
        .render()
        .map_err(|e| AppError::TemplateError(e.to_string()))
}

/// Invoice for the agency. The invoiced amount is the derived selling price.
pub fn render_invoice(
    reservation: &Reservation,
    breakdown: &PriceBreakdown,
) -> Result<String, AppError> {
    let agency = reservation.agency.as_ref();
    let description = format!(
        "{} ({} night{}, {} - {})",
        reservation.hotel.name,
        reservation.nights(),
        if reservation.nights() == 1 { "" } else { "s" },
        format_date(reservation.check_in),
        format_date(reservation.check_out),
    );

    let lines = vec![
        InvoiceLine {
            label: "Net price",
            amount: format_amount(breakdown.net_price),
        },
        InvoiceLine {
            label: "Commission",
            amount: format_amount(deduction(breakdown.commission)),
        },
        InvoiceLine {
            label: "Discount",
            amount: format_amount(deduction(breakdown.discount)),
        },
    ];

    let template = InvoiceTemplate {
        invoice_number: format!("INV-{}", reservation.display_reference()),
        reference: reservation.display_reference().to_string(),
        issued_on: format_date(Utc::now().date_naive()),
        agency_name: or_dash(agency.map(|a| a.name.as_str())),
        agency_address: or_dash(agency.and_then(|a| a.address.as_deref())),
        agency_email: or_dash(agency.and_then(|a| a.email.as_deref())),
        description,
        lead_guest: reservation.lead_guest.full_name(),
        currency: breakdown.currency.clone(),
        lines,
        total: format_amount(breakdown.selling_price),
    };

    template
        .render()
        .map_err(|e| AppError::TemplateError(e.to_string()))
}
