//! Services module for backoffice-service.

pub mod backend_client;
pub mod captcha;
pub mod documents;
pub mod mapping;
pub mod metrics;

pub use backend_client::BackendClient;
pub use captcha::CaptchaStore;
pub use mapping::MappingStore;
pub use metrics::{get_metrics, init_metrics};
