use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
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
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_secs = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let secs = or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if secs == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(secs)
    };

    let env = parse_environment(&or_default("DROPSHIP_ENV", "development"))?;
    let bind_addr = parse_addr("DROPSHIP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("DROPSHIP_LOG_LEVEL", "info");
    let settings_path = lookup("DROPSHIP_SETTINGS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let cycle_interval_secs = parse_secs("DROPSHIP_CYCLE_INTERVAL_SECS", "1800")?;
    let cycle_cooldown_secs = parse_secs("DROPSHIP_CYCLE_COOLDOWN_SECS", "60")?;
    let monitor_interval_secs = parse_secs("DROPSHIP_MONITOR_INTERVAL_SECS", "900")?;
    let trend_retry_secs = parse_secs("DROPSHIP_TREND_RETRY_SECS", "3600")?;
    let posting_flush_secs = parse_secs("DROPSHIP_POSTING_FLUSH_SECS", "3600")?;
    let max_publish_attempts = parse_u32("DROPSHIP_MAX_PUBLISH_ATTEMPTS", "3")?;
    if max_publish_attempts == 0 {
        return Err(invalid(
            "DROPSHIP_MAX_PUBLISH_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let autostart = parse_bool(&or_default("DROPSHIP_AUTOSTART", "false"))
        .ok_or_else(|| invalid("DROPSHIP_AUTOSTART", "expected true or false".to_string()))?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        settings_path,
        cycle_interval_secs,
        cycle_cooldown_secs,
        monitor_interval_secs,
        trend_retry_secs,
        posting_flush_secs,
        max_publish_attempts,
        autostart,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DROPSHIP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
