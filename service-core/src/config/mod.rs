use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load typed settings from `<dir>/base.yaml`, overlaid with `APP_`-prefixed
/// environment variables (`APP_BACKEND__BASE_URL` sets `backend.base_url`).
///
/// A `.env` file in the working directory is loaded first when present.
pub fn load<T: DeserializeOwned>(configuration_directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = Cfg::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

/// Resolve the configuration directory of a service crate, whether the
/// process was started from the workspace root or from the crate itself.
pub fn configuration_directory(crate_dir: &str) -> Result<std::path::PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(crate_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir).join("config"))
    }
}
