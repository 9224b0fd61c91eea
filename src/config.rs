use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::subscription::gates::RESET_ELIGIBILITY_THRESHOLD;
use crate::utils::get_env_with_prefix;

/// Main configuration for the account core
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// Settings for deriving the dashboard view from a subscription record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Usage percentage at which the "reset traffic" option is offered.
    #[serde(default = "default_reset_threshold")]
    pub reset_threshold_percent: f64,
    /// Offset of the user's local time from UTC, in seconds.
    ///
    /// Day-of-month comparisons and formatted dates use this offset.
    #[serde(default)]
    pub utc_offset_seconds: i32,
    /// `chrono` format string for expiry and reset dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            reset_threshold_percent: default_reset_threshold(),
            utc_offset_seconds: 0,
            date_format: default_date_format(),
        }
    }
}

impl DashboardConfig {
    /// The configured local offset.
    ///
    /// `build()` rejects out-of-range offsets, so the UTC fallback only
    /// applies to configs assembled by hand.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or(Utc.fix())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_reset_threshold() -> f64 {
    RESET_ELIGIBILITY_THRESHOLD
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_reset_threshold(mut self, percent: f64) -> Self {
        self.config.dashboard.reset_threshold_percent = percent;
        self
    }

    pub fn with_utc_offset_seconds(mut self, seconds: i32) -> Self {
        self.config.dashboard.utc_offset_seconds = seconds;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.config.dashboard.date_format = format.into();
        self
    }

    /// Load configuration from environment variables with ACCOUNT_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(threshold) = get_env_with_prefix("RESET_THRESHOLD_PERCENT") {
            if let Ok(t) = threshold.parse() {
                self.config.dashboard.reset_threshold_percent = t;
            }
        }
        if let Some(offset) = get_env_with_prefix("UTC_OFFSET_SECONDS") {
            if let Ok(o) = offset.parse() {
                self.config.dashboard.utc_offset_seconds = o;
            }
        }
        if let Some(format) = get_env_with_prefix("DATE_FORMAT") {
            self.config.dashboard.date_format = format;
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log level is unknown
    /// - The reset threshold is outside `(0, 100]`
    /// - The UTC offset is a day or more
    /// - The date format is empty
    pub fn build(self) -> crate::error::Result<Config> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(crate::error::AccountError::config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let threshold = self.config.dashboard.reset_threshold_percent;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 100.0 {
            return Err(crate::error::AccountError::config(format!(
                "Reset threshold must be within (0, 100], got: {}",
                threshold
            )));
        }

        if FixedOffset::east_opt(self.config.dashboard.utc_offset_seconds).is_none() {
            return Err(crate::error::AccountError::config(format!(
                "UTC offset out of range: {} seconds",
                self.config.dashboard.utc_offset_seconds
            )));
        }

        if self.config.dashboard.date_format.trim().is_empty() {
            return Err(crate::error::AccountError::config(
                "Date format must not be empty",
            ));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.dashboard.reset_threshold_percent, 80.0);
        assert_eq!(config.dashboard.utc_offset_seconds, 0);
        assert_eq!(config.dashboard.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_rejects_invalid_log_level() {
        let result = ConfigBuilder::new().with_log_level("loud").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        assert!(ConfigBuilder::new().with_reset_threshold(0.0).build().is_err());
        assert!(ConfigBuilder::new().with_reset_threshold(120.0).build().is_err());
        assert!(ConfigBuilder::new().with_reset_threshold(f64::NAN).build().is_err());
        assert!(ConfigBuilder::new().with_reset_threshold(100.0).build().is_ok());
    }

    #[test]
    fn test_rejects_offset_out_of_range() {
        let result = ConfigBuilder::new().with_utc_offset_seconds(86_400).build();
        assert!(result.is_err());

        let config = ConfigBuilder::new()
            .with_utc_offset_seconds(8 * 3600)
            .build()
            .unwrap();
        assert_eq!(config.dashboard.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_from_env() {
        unsafe {
            std::env::set_var("ACCOUNT_RESET_THRESHOLD_PERCENT", "90");
            std::env::set_var("ACCOUNT_UTC_OFFSET_SECONDS", "3600");
        }
        let config = ConfigBuilder::new().from_env().build().unwrap();
        unsafe {
            std::env::remove_var("ACCOUNT_RESET_THRESHOLD_PERCENT");
            std::env::remove_var("ACCOUNT_UTC_OFFSET_SECONDS");
        }

        assert_eq!(config.dashboard.reset_threshold_percent, 90.0);
        assert_eq!(config.dashboard.utc_offset_seconds, 3600);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{"dashboard":{"utc_offset_seconds":-18000}}"#).unwrap();
        assert_eq!(config.dashboard.utc_offset_seconds, -18000);
        assert_eq!(config.dashboard.reset_threshold_percent, 80.0);
        assert_eq!(config.logging.level, "info");
    }
}
