//! Lenient amount parsing for backend price fields.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Parse a monetary amount from a JSON number or numeric string.
///
/// Missing, null, non-numeric, NaN and infinite values all parse to zero.
pub fn parse_amount(value: &Value) -> Decimal {
    parse_optional_amount(value).unwrap_or(Decimal::ZERO)
}

/// Like [`parse_amount`] but distinguishes "absent or unparseable" from zero.
pub fn parse_optional_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let repr = n.to_string();
            parse_str(&repr).or_else(|| n.as_f64().and_then(from_finite_f64))
        }
        Value::String(s) => parse_str(s),
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn from_finite_f64(f: f64) -> Option<Decimal> {
    if f.is_finite() {
        Decimal::from_f64(f)
    } else {
        None
    }
}
