use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_PORTAL_URL: &str = "http://d.mealclub.com/";
const DEFAULT_USER_AGENT: &str = "mealclub-assistant/0.1";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

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

    let portal_username = require("MC_USERNAME")?;
    let portal_password = require("MC_PASSWORD")?;

    let env = parse_environment(&or_default("MEALCLUB_ENV", "development"));
    let log_level = or_default("MEALCLUB_LOG_LEVEL", "info");

    let portal_url = or_default("MEALCLUB_PORTAL_URL", DEFAULT_PORTAL_URL);
    if !(portal_url.starts_with("http://") || portal_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "MEALCLUB_PORTAL_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{portal_url}\""),
        });
    }

    let request_timeout_secs = parse_u64("MEALCLUB_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MEALCLUB_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    let user_agent = or_default("MEALCLUB_USER_AGENT", DEFAULT_USER_AGENT);

    Ok(AppConfig {
        env,
        log_level,
        portal_username,
        portal_password,
        portal_url,
        request_timeout_secs,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
