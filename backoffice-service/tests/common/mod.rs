#![allow(dead_code)]

use backoffice_service::config::{
    BackendSettings, ObservabilitySettings, RegistrationSettings, ServerSettings, Settings,
};
use backoffice_service::startup::Application;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use secrecy::Secret;
use serde_json::{json, Value};
use std::str::FromStr;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-backend-key";
pub const REGISTRATION_RATE_LIMIT: u32 = 3;
pub const CAPTCHA_RATE_LIMIT: u32 = 6;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub backend: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;

        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            backend: BackendSettings {
                base_url: backend.uri(),
                api_key: Secret::new(TEST_API_KEY.to_string()),
                timeout_seconds: 2,
            },
            observability: ObservabilitySettings {
                service_name: "backoffice-service-test".to_string(),
                log_level: "debug".to_string(),
                otlp_endpoint: None,
            },
            registration: RegistrationSettings {
                rate_limit_per_minute: REGISTRATION_RATE_LIMIT,
                captcha_rate_limit_per_minute: CAPTCHA_RATE_LIMIT,
                captcha_ttl_seconds: 300,
                trust_forwarded_for: false,
            },
        };

        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            backend,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Decimal fields serialize as strings.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("Not a decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("Not a decimal number"),
        other => panic!("Expected a decimal, got {}", other),
    }
}

pub fn days_from_now(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Backend reservation document.
pub fn reservation(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "reference": format!("BK-{}", id.to_uppercase()),
        "supplierReference": "HB-5566",
        "status": status,
        "hotel": {
            "name": "Atlantis The Palm",
            "address": "Crescent Road, The Palm",
            "city": "Dubai",
            "countryCode": "AE",
            "phone": "+971 4 426 2000",
            "roomType": "Deluxe King",
            "board": "Bed & Breakfast"
        },
        "checkIn": "2026-12-01",
        "checkOut": "2026-12-04",
        "rooms": 1,
        "adults": 2,
        "children": 0,
        "leadGuest": { "firstName": "Layla", "lastName": "Mansour", "email": "layla@example.com" },
        "agency": { "name": "Desert Rose Travel", "email": "ops@desertrose.example", "address": "Al Quoz, Dubai" },
        "supplier": "hotelbeds",
        "priceDetails": {
            "originalPrice": { "value": 100, "currency": "EUR" },
            "price": { "value": 115, "currency": "EUR" },
            "markupApplied": { "type": "fixed", "value": 20 }
        },
        "commission": 5,
        "cancellationPolicy": "Free cancellation until 7 days before arrival"
    })
}

/// Extract the answer from a "What is a + b?" challenge.
pub fn solve_captcha(question: &str) -> String {
    let sum: u32 = question
        .trim_start_matches("What is ")
        .trim_end_matches('?')
        .split('+')
        .map(|n| n.trim().parse::<u32>().expect("Unexpected captcha operand"))
        .sum();
    sum.to_string()
}
