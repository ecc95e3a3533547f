use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::geo::GeoPoint;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// development config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("RUTASDX_ENV", "development"))?;
    let log_level = or_default("RUTASDX_LOG_LEVEL", "info");
    let storage_path = PathBuf::from(or_default(
        "RUTASDX_STORAGE_PATH",
        "./.rutasdx/storage.json",
    ));
    let catalog_path = lookup("RUTASDX_CATALOG_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let search_delay_ms = parse_u64("RUTASDX_SEARCH_DELAY_MS", "1500")?;
    let locate_timeout_secs = parse_u64("RUTASDX_LOCATE_TIMEOUT_SECS", "10")?;
    if locate_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RUTASDX_LOCATE_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let default_center = parse_point(
        "RUTASDX_DEFAULT_CENTER",
        &or_default("RUTASDX_DEFAULT_CENTER", "19.4326,-99.1332"),
    )?;
    let device_location = match lookup("RUTASDX_LOCATION") {
        Ok(raw) if !raw.trim().is_empty() => Some(parse_point("RUTASDX_LOCATION", &raw)?),
        _ => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        storage_path,
        catalog_path,
        search_delay_ms,
        locate_timeout_secs,
        default_center,
        device_location,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RUTASDX_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a `lat,lng` pair such as `19.4326,-99.1332`.
fn parse_point(var: &str, raw: &str) -> Result<GeoPoint, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| invalid(format!("expected 'lat,lng', got '{raw}'")))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(format!("latitude: {e}")))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(format!("longitude: {e}")))?;

    GeoPoint::new(lat, lng).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
