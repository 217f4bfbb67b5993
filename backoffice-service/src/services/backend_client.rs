//! REST client for the booking backend.
//!
//! Every call propagates trace context and the inbound request ID. Transport
//! failures surface as `BadGateway`; no retries are attempted.

use crate::config::BackendSettings;
use crate::models::{
    AgencyRegistration, Cancellation, ListReservationsFilter, NewReservation, PriceUpdate,
    Reservation, ReservationPage,
};
use crate::services::metrics::{BACKEND_ERRORS_TOTAL, BACKEND_REQUEST_DURATION};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::time::Duration;
use tracing::instrument;

/// Backend response to an agency sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyCreated {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds.max(1)))
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// `/reservations/{id}[/{action}]`, with the id encoded as one path segment.
    fn reservation_url(
        &self,
        reservation_id: &str,
        action: Option<&str>,
    ) -> Result<String, AppError> {
        if !is_reservation_id(reservation_id) {
            return Err(AppError::BadRequest(anyhow::anyhow!("Invalid booking id")));
        }

        let mut url = Url::parse(self.base_url()).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid backend base URL: {}", e))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!("Backend base URL cannot carry a path"))
            })?;
            segments.pop_if_empty().push("reservations").push(reservation_id);
            if let Some(action) = action {
                segments.push(action);
            }
        }

        Ok(url.into())
    }

    fn authorize(&self, request: TracedRequest, request_id: Option<&str>) -> TracedRequest {
        let request = request.request_id(request_id);
        match self.settings.api_key() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Check that the backend answers its health endpoint.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let response = self
            .client
            .traced_get(&self.url("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map_err(|e| transport_error("health", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::ServiceUnavailable)
        }
    }

    #[instrument(skip(self, filter), fields(page = filter.page, page_size = filter.page_size))]
    pub async fn list_reservations(
        &self,
        filter: &ListReservationsFilter,
        request_id: Option<&str>,
    ) -> Result<ReservationPage, AppError> {
        let request = self
            .client
            .traced_get(&self.url("/reservations"))
            .query(filter);

        self.execute("list_reservations", self.authorize(request, request_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_reservation(
        &self,
        reservation_id: &str,
        request_id: Option<&str>,
    ) -> Result<Reservation, AppError> {
        let url = self.reservation_url(reservation_id, None)?;
        let request = self.client.traced_get(&url);

        self.execute("get_reservation", self.authorize(request, request_id))
            .await
    }

    #[instrument(skip(self, cancellation))]
    pub async fn cancel_reservation(
        &self,
        reservation_id: &str,
        cancellation: &Cancellation,
        request_id: Option<&str>,
    ) -> Result<Reservation, AppError> {
        let url = self.reservation_url(reservation_id, Some("cancel"))?;
        let request = self.client.traced_post(&url).json(cancellation);

        self.execute("cancel_reservation", self.authorize(request, request_id))
            .await
    }

    #[instrument(skip(self, update))]
    pub async fn update_price(
        &self,
        reservation_id: &str,
        update: &PriceUpdate,
        request_id: Option<&str>,
    ) -> Result<Reservation, AppError> {
        let url = self.reservation_url(reservation_id, Some("price"))?;
        let request = self.client.traced_put(&url).json(update);

        self.execute("update_price", self.authorize(request, request_id))
            .await
    }

    #[instrument(skip(self, reservation), fields(supplier = %reservation.supplier))]
    pub async fn create_reservation(
        &self,
        reservation: &NewReservation,
        request_id: Option<&str>,
    ) -> Result<Reservation, AppError> {
        let request = self
            .client
            .traced_post(&self.url("/reservations"))
            .json(reservation);

        self.execute("create_reservation", self.authorize(request, request_id))
            .await
    }

    #[instrument(skip(self, registration), fields(country = %registration.country_code))]
    pub async fn register_agency(
        &self,
        registration: &AgencyRegistration,
        request_id: Option<&str>,
    ) -> Result<AgencyCreated, AppError> {
        let request = self
            .client
            .traced_post(&self.url("/agencies"))
            .json(registration);

        self.execute("register_agency", self.authorize(request, request_id))
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: TracedRequest,
    ) -> Result<T, AppError> {
        let timer = BACKEND_REQUEST_DURATION
            .with_label_values(&[operation])
            .start_timer();

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        timer.observe_duration();

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = map_status(status, &body);
            BACKEND_ERRORS_TOTAL
                .with_label_values(&[operation, err.kind()])
                .inc();
            tracing::warn!(
                operation = operation,
                status = status.as_u16(),
                body = %truncate(&body, 512),
                "Booking backend returned an error"
            );
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| {
            BACKEND_ERRORS_TOTAL
                .with_label_values(&[operation, "decode"])
                .inc();
            tracing::error!(operation = operation, error = %e, "Failed to decode backend response");
            AppError::BadGateway(format!("Invalid response from booking backend: {}", e))
        })
    }
}

fn transport_error(operation: &'static str, e: reqwest::Error) -> AppError {
    let kind = if e.is_timeout() { "timeout" } else { "transport" };
    BACKEND_ERRORS_TOTAL
        .with_label_values(&[operation, kind])
        .inc();
    tracing::error!(operation = operation, error = %e, "Booking backend request failed");

    if e.is_timeout() {
        AppError::BadGateway("Booking backend timed out".to_string())
    } else {
        AppError::BadGateway("Booking backend unreachable".to_string())
    }
}

/// Booking ids are opaque backend tokens: letters, digits, `-` and `_`.
fn is_reservation_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Translate a backend error status into the service's error taxonomy.
pub fn map_status(status: StatusCode, body: &str) -> AppError {
    let message = backend_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Backend error")
            .to_string()
    });

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(anyhow::anyhow!(message)),
        StatusCode::CONFLICT => AppError::Conflict(anyhow::anyhow!(message)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::BadRequest(anyhow::anyhow!(message))
        }
        _ => AppError::BadGateway(message),
    }
}

/// Pull a human readable message out of a backend error body.
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, ""),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            map_status(StatusCode::CONFLICT, ""),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            map_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            AppError::BadGateway(_)
        ));
    }

    #[test]
    fn backend_message_is_preferred() {
        let err = map_status(StatusCode::CONFLICT, r#"{"message":"already cancelled"}"#);
        assert_eq!(err.to_string(), "Conflict: already cancelled");
    }

    fn client(base_url: &str) -> BackendClient {
        BackendClient::new(BackendSettings {
            base_url: base_url.to_string(),
            api_key: secrecy::Secret::new(String::new()),
            timeout_seconds: 1,
        })
        .unwrap()
    }

    #[test]
    fn reservation_url_keeps_id_in_one_segment() {
        let backend = client("http://backend.local/api/");

        assert_eq!(
            backend.reservation_url("r-42", Some("cancel")).unwrap(),
            "http://backend.local/api/reservations/r-42/cancel"
        );
        assert_eq!(
            client("http://backend.local").reservation_url("R_1", None).unwrap(),
            "http://backend.local/reservations/R_1"
        );
    }

    #[test]
    fn reservation_url_rejects_path_like_ids() {
        let backend = client("http://backend.local");

        for id in ["", "..", "../agencies", "a/b", "r 1", "r%2F1", "r?x=1"] {
            assert!(
                matches!(backend.reservation_url(id, None), Err(AppError::BadRequest(_))),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
