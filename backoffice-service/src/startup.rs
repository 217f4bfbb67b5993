//! Application startup and lifecycle management.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimit},
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{RegistrationSettings, Settings};
use crate::handlers::{
    bookings, documents, health, manual_reservation, mapping, metrics, registration,
};
use crate::services::{BackendClient, CaptchaStore, MappingStore};
use crate::AppState;

/// Per-IP limits on the public registration routes.
#[derive(Clone)]
pub struct RegistrationLimits {
    pub captcha: IpRateLimit,
    pub submit: IpRateLimit,
}

impl RegistrationLimits {
    pub fn from_settings(settings: &RegistrationSettings) -> Self {
        let trust = settings.trust_forwarded_for;
        Self {
            captcha: IpRateLimit::new(
                create_ip_rate_limiter(settings.captcha_rate_limit_per_minute, 60),
                trust,
            ),
            submit: IpRateLimit::new(
                create_ip_rate_limiter(settings.rate_limit_per_minute, 60),
                trust,
            ),
        }
    }
}

pub fn build_router(state: AppState, limits: RegistrationLimits) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(metrics::metrics))
        // Registration
        .route(
            "/api/registrations/captcha",
            get(registration::captcha).layer(from_fn_with_state(
                limits.captcha,
                ip_rate_limit_middleware,
            )),
        )
        .route(
            "/api/registrations",
            post(registration::register).layer(from_fn_with_state(
                limits.submit,
                ip_rate_limit_middleware,
            )),
        )
        // Bookings
        .route("/api/bookings", get(bookings::list_bookings))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route(
            "/api/bookings/:id/price/preview",
            post(bookings::preview_price),
        )
        .route("/api/bookings/:id/price", put(bookings::update_price))
        .route("/api/bookings/:id/voucher", get(documents::voucher))
        .route("/api/bookings/:id/invoice", get(documents::invoice))
        // Manual reservations
        .route(
            "/api/manual-reservations/steps/:step",
            post(manual_reservation::validate_step),
        )
        .route(
            "/api/manual-reservations/quote",
            post(manual_reservation::quote),
        )
        .route(
            "/api/manual-reservations",
            post(manual_reservation::create_manual_reservation),
        )
        // Supplier mapping
        .route("/api/mapping/countries", get(mapping::countries))
        .route("/api/mapping/hotels", get(mapping::hotels))
        .route(
            "/api/mapping/decisions",
            get(mapping::list_decisions).post(mapping::record_decision),
        )
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given settings. Port 0 binds a random port.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let backend = BackendClient::new(settings.backend.clone())?;
        tracing::info!(base_url = %backend.base_url(), "Booking backend client initialized");

        let state = AppState::new(
            Arc::new(backend),
            Arc::new(CaptchaStore::new(Duration::from_secs(
                settings.registration.captcha_ttl_seconds,
            ))),
            Arc::new(MappingStore::new()),
        );

        let limits = RegistrationLimits::from_settings(&settings.registration);

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Backoffice service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state, limits),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
