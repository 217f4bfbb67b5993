//! Backoffice Service entry point.

use backoffice_service::config::get_configuration;
use backoffice_service::services::init_metrics;
use backoffice_service::startup::Application;

use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let settings = get_configuration().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        &settings.observability.service_name,
        &settings.observability.log_level,
        settings.observability.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        otlp_endpoint = ?settings.observability.otlp_endpoint,
        "Starting backoffice-service"
    );

    init_metrics();

    tracing::info!(
        host = %settings.server.host,
        port = %settings.server.port,
        backend_url = %settings.backend.base_url,
        backend_timeout_seconds = settings.backend.timeout_seconds,
        backend_api_key_set = settings.backend.api_key().is_some(),
        registration_rate_limit = settings.registration.rate_limit_per_minute,
        captcha_rate_limit = settings.registration.captcha_rate_limit_per_minute,
        trust_forwarded_for = settings.registration.trust_forwarded_for,
        "Configuration loaded"
    );

    let app = Application::build(settings).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    tokio::select! {
        result = app.run_until_stopped() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Application error");
                return Err(e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("Graceful shutdown initiated");
        }
    }

    tracing::info!("Service shutdown complete");
    Ok(())
}
