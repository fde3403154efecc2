//! Application settings loaded from `shopdesk.toml`.
//!
//! Every field has a default, so a missing file or a partial file both produce a
//! usable configuration. `DATABASE_URL` in the environment overrides the file.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::core::report::Metric;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "shopdesk.toml";

/// Top-level settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Record store connection string
    pub database_url: String,
    /// Fallback `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Dashboard defaults
    pub dashboard: DashboardSettings,
    /// Local identity provider rules
    pub auth: AuthSettings,
}

/// Dashboard defaults
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardSettings {
    /// Length of the default date range, ending today
    pub trailing_days: u32,
    /// Metrics plotted when the dashboard opens
    pub default_metrics: Vec<Metric>,
}

/// Local identity provider rules
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthSettings {
    /// Shorter passwords are rejected as weak
    pub min_password_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_filter: "info".to_string(),
            dashboard: DashboardSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            trailing_days: 30,
            default_metrics: vec![Metric::Revenue, Metric::TotalSales],
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            min_password_len: 6,
        }
    }
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from a TOML file.
///
/// A missing file is not an error; defaults are used instead.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    debug!("Loading settings from {:?}", path);
    let contents = std::fs::read_to_string(path)?;
    parse_settings(&contents)
}

/// Loads settings from `SHOPDESK_CONFIG` (or `./shopdesk.toml`) and applies the
/// `DATABASE_URL` override.
///
/// # Errors
/// Returns an error if the settings file exists but is invalid.
pub fn load_default_settings() -> Result<Settings> {
    let path =
        std::env::var("SHOPDESK_CONFIG").unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
    let mut settings = load_settings(path)?;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        settings.database_url = url;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            database_url = "sqlite::memory:"
            log_filter = "shopdesk=debug"

            [dashboard]
            trailing_days = 7
            default_metrics = ["organic_sales", "ad_sales"]

            [auth]
            min_password_len = 8
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.log_filter, "shopdesk=debug");
        assert_eq!(settings.dashboard.trailing_days, 7);
        assert_eq!(
            settings.dashboard.default_metrics,
            vec![Metric::OrganicSales, Metric::AdSales]
        );
        assert_eq!(settings.auth.min_password_len, 8);
    }

    #[test]
    fn test_partial_settings_fall_back_to_defaults() {
        let settings = parse_settings("[dashboard]\ntrailing_days = 14\n").unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.dashboard.trailing_days, 14);
        assert_eq!(
            settings.dashboard.default_metrics,
            vec![Metric::Revenue, Metric::TotalSales]
        );
        assert_eq!(settings.auth.min_password_len, 6);
    }

    #[test]
    fn test_invalid_settings_are_config_errors() {
        let result = parse_settings("trailing_days = [");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = load_settings("definitely/not/here/shopdesk.toml").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
