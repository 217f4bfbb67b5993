use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Too many requests: {0}")]
    TooManyRequests(String, Option<u64>),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Service Unavailable")]
    ServiceUnavailable,

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    /// Single-field validation error, for checks that run outside a
    /// `#[derive(Validate)]` struct.
    pub fn field_invalid(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }

    /// Short label used for error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::TooManyRequests(..) => "rate_limited",
            AppError::InternalError(_) => "internal",
            AppError::BadGateway(_) => "bad_gateway",
            AppError::ServiceUnavailable => "unavailable",
            AppError::TemplateError(_) => "template",
            AppError::ConfigError(_) => "config",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(..) => StatusCode::TOO_MANY_REQUESTS,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) | AppError::TemplateError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    /// Per-field validation failures, keyed by field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut retry_after = None;

        let body = match self {
            AppError::ValidationError(errors) => ErrorBody {
                error: "Validation error".to_string(),
                details: Some(errors.to_string()),
                fields: serde_json::to_value(&errors).ok(),
            },
            AppError::BadRequest(err) | AppError::NotFound(err) | AppError::Conflict(err) => {
                ErrorBody {
                    error: err.to_string(),
                    details: None,
                    fields: None,
                }
            }
            AppError::TooManyRequests(message, retry) => {
                retry_after = retry;
                ErrorBody {
                    error: message,
                    details: None,
                    fields: None,
                }
            }
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Internal error");
                ErrorBody {
                    error: "Internal server error".to_string(),
                    details: None,
                    fields: None,
                }
            }
            AppError::BadGateway(message) => ErrorBody {
                error: format!("Bad Gateway: {}", message),
                details: None,
                fields: None,
            },
            AppError::ServiceUnavailable => ErrorBody {
                error: "Service unavailable".to_string(),
                details: None,
                fields: None,
            },
            AppError::TemplateError(message) => {
                tracing::error!(error = %message, "Document rendering failed");
                ErrorBody {
                    error: "Document rendering failed".to_string(),
                    details: None,
                    fields: None,
                }
            }
            AppError::ConfigError(err) => ErrorBody {
                error: "Configuration error".to_string(),
                details: Some(err.to_string()),
                fields: None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, seconds.into());
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_422() {
        let err = AppError::field_invalid("captcha_answer", "captcha_mismatch", "wrong answer");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn too_many_requests_sets_retry_after() {
        let response =
            AppError::TooManyRequests("slow down".to_string(), Some(30)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
    }

    #[test]
    fn upstream_errors_are_bad_gateway() {
        let err = AppError::BadGateway("backend timed out".to_string());
        assert_eq!(err.kind(), "bad_gateway");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::TemplateError("missing field".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
