//! Settings loaded from the process environment via `envy`.
//!
//! Each settings struct is read once at command start and passed down by
//! reference; nothing below the command layer reads the environment.

use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::domain::{CleanupSettings, ConfigError, DeviceSettings, TemplateSettings};

/// Deserialize settings from the live environment.
///
/// # Errors
///
/// Returns `ConfigError::Environment` naming the first missing or unparsable
/// variable.
pub fn from_env<T: DeserializeOwned>() -> Result<T> {
    envy::from_env::<T>().map_err(|e| environment_error(&e).into())
}

/// Deserialize settings from explicit `(NAME, value)` pairs.
///
/// # Errors
///
/// Same as [`from_env`].
pub fn from_vars<T, I>(vars: I) -> Result<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    envy::from_iter::<_, T>(vars).map_err(|e| environment_error(&e).into())
}

fn environment_error(e: &envy::Error) -> ConfigError {
    match e {
        envy::Error::MissingValue(field) => {
            ConfigError::Environment(format!("{} is required", field.to_uppercase()))
        }
        other => ConfigError::Environment(other.to_string()),
    }
}

/// Load and validate `jitp template` settings.
///
/// # Errors
///
/// Returns an error if a variable is missing or invalid.
pub fn template_settings() -> Result<TemplateSettings> {
    let settings = from_env::<TemplateSettings>()?.normalized();
    settings.validate()?;
    Ok(settings)
}

/// Load and validate `jitp connect` settings.
///
/// # Errors
///
/// Returns an error if a variable is missing or invalid.
pub fn device_settings() -> Result<DeviceSettings> {
    let settings = from_env::<DeviceSettings>()?;
    settings.validate()?;
    Ok(settings)
}

/// Load and validate `jitp delete` settings.
///
/// # Errors
///
/// Returns an error if a variable is missing or invalid.
pub fn cleanup_settings() -> Result<CleanupSettings> {
    let settings = from_env::<CleanupSettings>()?;
    settings.validate()?;
    Ok(settings)
}
