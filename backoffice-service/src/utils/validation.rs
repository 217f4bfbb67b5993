use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::{Validate, ValidationError};

/// JSON body that has passed `validator` checks.
///
/// Malformed JSON is a 400; a body that parses but fails validation is a 422.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Query string that has passed `validator` checks.
pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid query: {}", e)))?;

        value.validate()?;

        Ok(ValidatedQuery(value))
    }
}

/// Largest amount (or percentage) accepted from a form.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn within_max(value: &Decimal) -> Result<(), ValidationError> {
    if *value > MAX_AMOUNT {
        let mut error = ValidationError::new("too_large");
        error.message = Some("Must not exceed 1000000000".into());
        return Err(error);
    }
    Ok(())
}

pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("Must not be negative".into());
        return Err(error);
    }
    within_max(value)
}

pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.message = Some("Must be greater than zero".into());
        return Err(error);
    }
    within_max(value)
}

/// ISO 3166-1 alpha-2 shape: two ASCII letters.
pub fn country_code(value: &str) -> Result<(), ValidationError> {
    if value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(());
    }
    let mut error = ValidationError::new("country_code");
    error.message = Some("Must be a two-letter country code".into());
    Err(error)
}

/// ISO 4217 shape: three ASCII letters.
pub fn currency_code(value: &str) -> Result<(), ValidationError> {
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(());
    }
    let mut error = ValidationError::new("currency_code");
    error.message = Some("Must be a three-letter currency code".into());
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_bounds() {
        assert!(non_negative(&dec!(0)).is_ok());
        assert!(non_negative(&dec!(-0.01)).is_err());
        assert!(positive(&dec!(0.01)).is_ok());
        assert!(positive(&dec!(0)).is_err());
    }

    #[test]
    fn decimal_upper_bound() {
        assert!(non_negative(&MAX_AMOUNT).is_ok());
        assert!(positive(&dec!(1000000000)).is_ok());
        assert_eq!(
            non_negative(&Decimal::MAX).unwrap_err().code,
            "too_large"
        );
        assert_eq!(positive(&dec!(1000000000.01)).unwrap_err().code, "too_large");
    }

    #[test]
    fn code_shapes() {
        assert!(country_code("AE").is_ok());
        assert!(country_code("ARE").is_err());
        assert!(country_code("1E").is_err());
        assert!(currency_code("eur").is_ok());
        assert!(currency_code("EU").is_err());
    }
}
