//! Back office for a travel wholesaler: agency registration, booking list and
//! overview with price editing and cancellation, manual reservations,
//! vouchers and invoices, and supplier mapping.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod services;
pub mod startup;
pub mod utils;

pub use startup::Application;

use services::{BackendClient, CaptchaStore, MappingStore};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub captcha: Arc<CaptchaStore>,
    pub mapping: Arc<MappingStore>,
}

impl AppState {
    pub fn new(backend: Arc<BackendClient>, captcha: Arc<CaptchaStore>, mapping: Arc<MappingStore>) -> Self {
        Self {
            backend,
            captcha,
            mapping,
        }
    }
}
