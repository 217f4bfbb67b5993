//! Price breakdown calculator.
//!
//! Every workflow that shows or changes a price (booking list, overview,
//! edit-price, manual reservation) derives its breakdown here:
//!
//! ```text
//! NP = S + M
//! SP = NP - C - D
//! ```
//!
//! where S is the supplier price, M the markup (flat or percentage of S),
//! C the commission and D the discount. When no markup is known it is
//! back-solved from the quoted selling price as `M = SP - S + C + D`.

mod parse;

pub use parse::{parse_amount, parse_optional_amount};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PriceDetails;

/// How a markup value is applied to the supplier price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupKind {
    Fixed,
    Percentage,
}

impl MarkupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkupKind::Fixed => "fixed",
            MarkupKind::Percentage => "percentage",
        }
    }

    /// Anything other than "percentage" is treated as a flat amount.
    pub fn from_string(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" => MarkupKind::Percentage,
            _ => MarkupKind::Fixed,
        }
    }
}

/// Markup as configured on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupApplied {
    #[serde(rename = "type")]
    pub kind: MarkupKind,
    pub value: Decimal,
}

impl MarkupApplied {
    pub fn fixed(value: Decimal) -> Self {
        Self {
            kind: MarkupKind::Fixed,
            value,
        }
    }

    pub fn percentage(value: Decimal) -> Self {
        Self {
            kind: MarkupKind::Percentage,
            value,
        }
    }
}

/// Where the markup amount of a breakdown came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupSource {
    /// Computed from an explicit markup setting.
    Applied,
    /// Recovered from the quoted selling price.
    BackSolved,
}

/// Canonical inputs to the calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceInputs {
    pub currency: String,
    pub supplier_price: Decimal,
    /// Selling price as quoted by the backend, if known.
    pub quoted_selling_price: Option<Decimal>,
    pub markup: Option<MarkupApplied>,
    pub commission: Decimal,
    pub discount: Decimal,
}

impl PriceInputs {
    /// Build inputs from a fetched reservation's price details.
    ///
    /// Discount is not part of the backend contract; callers pass zero
    /// unless they track one themselves.
    pub fn from_price_details(details: &PriceDetails, commission: Decimal, discount: Decimal) -> Self {
        let currency = if details.original_price.currency.is_empty() {
            details.price.currency.clone()
        } else {
            details.original_price.currency.clone()
        };

        Self {
            currency,
            supplier_price: parse_amount(&details.original_price.value),
            quoted_selling_price: Some(parse_amount(&details.price.value)),
            markup: details.markup_applied.as_ref().map(|raw| raw.to_markup()),
            commission,
            discount,
        }
    }
}

/// Five-way price breakdown. `selling_price == net_price - commission - discount`
/// holds for every value returned by [`derive_breakdown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub currency: String,
    pub supplier_price: Decimal,
    pub markup: Decimal,
    pub markup_source: MarkupSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup_applied: Option<MarkupApplied>,
    pub net_price: Decimal,
    pub commission: Decimal,
    pub discount: Decimal,
    pub selling_price: Decimal,
    /// Selling price the backend quoted, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_selling_price: Option<Decimal>,
    /// True when the derived selling price differs from the quoted one,
    /// e.g. because of a discount the backend does not expose.
    pub diverges_from_quoted: bool,
}

/// Markup amount for a supplier price. `None` when the amount overflows.
pub fn markup_amount(supplier_price: Decimal, markup: &MarkupApplied) -> Option<Decimal> {
    match markup.kind {
        MarkupKind::Percentage => supplier_price
            .checked_mul(markup.value)?
            .checked_div(Decimal::ONE_HUNDRED),
        MarkupKind::Fixed => Some(markup.value),
    }
}

/// `(markup, net_price, selling_price)`, or `None` on overflow.
fn checked_amounts(inputs: &PriceInputs) -> Option<(Decimal, Decimal, Decimal)> {
    let s = inputs.supplier_price;
    let c = inputs.commission;
    let d = inputs.discount;

    let markup = match &inputs.markup {
        Some(applied) => markup_amount(s, applied)?,
        None => inputs
            .quoted_selling_price
            .unwrap_or(Decimal::ZERO)
            .checked_sub(s)?
            .checked_add(c)?
            .checked_add(d)?,
    };
    let net_price = s.checked_add(markup)?;
    let selling_price = net_price.checked_sub(c)?.checked_sub(d)?;

    Some((markup, net_price, selling_price))
}

/// Derive the full breakdown. Never fails and never clamps: a zero supplier
/// price with a large commission yields a negative selling price. Inputs
/// whose arithmetic overflows degrade to a zeroed breakdown.
pub fn derive_breakdown(inputs: &PriceInputs) -> PriceBreakdown {
    let markup_source = if inputs.markup.is_some() {
        MarkupSource::Applied
    } else {
        MarkupSource::BackSolved
    };

    let (supplier_price, commission, discount, (markup, net_price, selling_price)) =
        match checked_amounts(inputs) {
            Some(amounts) => (
                inputs.supplier_price,
                inputs.commission,
                inputs.discount,
                amounts,
            ),
            None => {
                tracing::warn!(
                    currency = %inputs.currency,
                    "Price arithmetic overflowed, using a zeroed breakdown"
                );
                (
                    Decimal::ZERO,
                    Decimal::ZERO,
                    Decimal::ZERO,
                    (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
                )
            }
        };

    let diverges_from_quoted = inputs
        .quoted_selling_price
        .is_some_and(|quoted| quoted != selling_price);

    PriceBreakdown {
        currency: inputs.currency.clone(),
        supplier_price,
        markup,
        markup_source,
        markup_applied: inputs.markup,
        net_price,
        commission,
        discount,
        selling_price,
        quoted_selling_price: inputs.quoted_selling_price,
        diverges_from_quoted,
    }
}

/// Edited pricing terms. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceEdit {
    pub markup: Option<MarkupApplied>,
    pub commission: Option<Decimal>,
    pub discount: Option<Decimal>,
}

/// Recompute a breakdown with edited terms.
///
/// A back-solved markup is pinned as a flat amount first, so that editing
/// only the commission moves the selling price instead of the markup.
pub fn reprice(current: &PriceBreakdown, edit: PriceEdit) -> PriceBreakdown {
    let markup = edit
        .markup
        .or(current.markup_applied)
        .unwrap_or_else(|| MarkupApplied::fixed(current.markup));

    derive_breakdown(&PriceInputs {
        currency: current.currency.clone(),
        supplier_price: current.supplier_price,
        quoted_selling_price: current.quoted_selling_price,
        markup: Some(markup),
        commission: edit.commission.unwrap_or(current.commission),
        discount: edit.discount.unwrap_or(current.discount),
    })
}
