//! Configuration module for backoffice-service.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
    #[serde(default)]
    pub registration: RegistrationSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Remote booking backend that owns reservations, pricing and agencies.
#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    pub base_url: String,
    /// Sent as a bearer token when non-empty.
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl BackendSettings {
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.expose_secret();
        if key.is_empty() {
            None
        } else {
            Some(key.as_str())
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilitySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct RegistrationSettings {
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    #[serde(default = "default_captcha_rate_limit")]
    pub captcha_rate_limit_per_minute: u32,
    #[serde(default = "default_captcha_ttl")]
    pub captcha_ttl_seconds: u64,
    /// Key rate limits on `x-forwarded-for`. Only enable behind a proxy
    /// that sets the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: default_rate_limit(),
            captcha_rate_limit_per_minute: default_captcha_rate_limit(),
            captcha_ttl_seconds: default_captcha_ttl(),
            trust_forwarded_for: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_service_name() -> String {
    "backoffice-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rate_limit() -> u32 {
    10
}

fn default_captcha_rate_limit() -> u32 {
    30
}

fn default_captcha_ttl() -> u64 {
    300
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let configuration_directory =
        service_core::config::configuration_directory("backoffice-service")?;
    service_core::config::load(&configuration_directory)
}
