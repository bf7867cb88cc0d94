use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::louver::LouverPosition;

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "AIRCYCLE_CONFIG";

/// Prefix for per-setting environment overrides, e.g. `AIRCYCLE__DEVICE__PASSWORD`.
const ENV_PREFIX: &str = "AIRCYCLE";
const ENV_SEPARATOR: &str = "__";

/// Values written into a fresh template; validation rejects them.
const PLACEHOLDER_PREFIX: &str = "YOUR_";

/// A single validation finding
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into a single line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Vendor cloud account and target unit
    #[serde(default)]
    pub device: DeviceConfig,

    /// Louver cycling
    #[serde(default)]
    pub louver: LouverConfig,

    /// Weather-driven setpoint control
    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Account e-mail used for sign-in
    pub username: String,

    pub password: String,

    /// Vendor-issued application identity
    pub app_id: String,
    pub app_secret: String,

    /// Device serial number of the unit to drive
    pub dsn: String,

    /// Base URL of the user/authentication service
    pub user_base_url: String,

    /// Base URL of the device (ADS) service
    pub ads_base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl DeviceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            username: "YOUR_EMAIL".to_string(),
            password: "YOUR_PASSWORD".to_string(),
            app_id: "YOUR_APP_ID".to_string(),
            app_secret: "YOUR_APP_SECRET".to_string(),
            dsn: String::new(),
            user_base_url: "https://user-field.aylanetworks.com".to_string(),
            ads_base_url: "https://ads-field.aylanetworks.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("dsn", &self.dsn)
            .field("user_base_url", &self.user_base_url)
            .field("ads_base_url", &self.ads_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LouverConfig {
    /// Position codes to rotate through, in order
    pub positions: Vec<String>,

    /// Seconds between cycles
    pub interval_secs: u64,
}

impl LouverConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Parse the configured codes.
    ///
    /// # Errors
    /// Fails on an empty list or on any code outside `0..=8`.
    pub fn positions(&self) -> Result<Vec<LouverPosition>, ConfigError> {
        if self.positions.is_empty() {
            return Err(ConfigError::missing("louver.positions"));
        }
        self.positions.iter().map(|p| p.parse()).collect()
    }
}

impl Default for LouverConfig {
    fn default() -> Self {
        Self {
            positions: vec!["7".to_string(), "8".to_string()],
            interval_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Raise the setpoint on hot days
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// City name, geocoded when no coordinates are given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    pub forecast_base_url: String,
    pub geocoding_base_url: String,
}

impl WeatherConfig {
    /// Whether either coordinates or a city name is present.
    pub fn has_location(&self) -> bool {
        (self.latitude.is_some() && self.longitude.is_some())
            || self.city.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            latitude: None,
            longitude: None,
            city: None,
            forecast_base_url: "https://api.open-meteo.com".to_string(),
            geocoding_base_url: "https://geocoding-api.open-meteo.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    value.trim().is_empty() || value.starts_with(PLACEHOLDER_PREFIX)
}

impl Config {
    /// Load configuration from `$AIRCYCLE_CONFIG` or the default location.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(p) => PathBuf::from(p),
            None => Self::config_path()?,
        };
        Self::load_from(&path)
    }

    /// Load configuration from a file, layering `AIRCYCLE__*` environment
    /// overrides on top. A missing file is replaced by a template.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::default().save_to(path)?;
            tracing::warn!(
                path = %path.display(),
                "Config file not found, wrote a template to fill in"
            );
        }

        let source = ::config::Config::builder()
            .add_source(
                ::config::File::from(path.to_path_buf()).format(::config::FileFormat::Toml),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR),
            )
            .build()
            .context("Failed to read config file")?;

        let config: Config = source
            .try_deserialize()
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Validate and turn errors into a single `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let validation = self.validate();

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if is_placeholder(&self.device.username) {
            result.add_error("device.username", "Account e-mail is not set");
        }
        if is_placeholder(&self.device.password) {
            result.add_error("device.password", "Account password is not set");
        }
        if is_placeholder(&self.device.app_id) || is_placeholder(&self.device.app_secret) {
            result.add_error("device.app_id", "Application id/secret are not set");
        }
        if self.device.dsn.trim().is_empty() {
            result.add_error("device.dsn", "Device serial number is not set");
        }
        self.validate_url(&self.device.user_base_url, "device.user_base_url", &mut result);
        self.validate_url(&self.device.ads_base_url, "device.ads_base_url", &mut result);

        if self.device.request_timeout_secs == 0 {
            result.add_error(
                "device.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if let Err(e) = self.louver.positions() {
            result.add_error("louver.positions", e.to_string());
        }

        if self.louver.interval_secs == 0 {
            result.add_error("louver.interval_secs", "Interval must be greater than 0");
        } else if self.louver.interval_secs < 60 {
            result.add_warning(
                "louver.interval_secs",
                "Interval under a minute may hit vendor rate limits",
            );
        }

        self.validate_weather(&mut result);

        result
    }

    fn validate_weather(&self, result: &mut ValidationResult) {
        let weather = &self.weather;

        if let Some(lat) = weather.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                result.add_error("weather.latitude", format!("Latitude {} out of range", lat));
            }
        }
        if let Some(lon) = weather.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                result.add_error(
                    "weather.longitude",
                    format!("Longitude {} out of range", lon),
                );
            }
        }
        if weather.latitude.is_some() != weather.longitude.is_some() {
            result.add_warning(
                "weather",
                "Only one of latitude/longitude is set; coordinates are ignored",
            );
        }

        // A missing location is reported every cycle at runtime, not fatal here.
        if weather.enabled && !weather.has_location() {
            result.add_warning(
                "weather",
                "Weather control is enabled but no coordinates or city are configured",
            );
        }

        self.validate_url(&weather.forecast_base_url, "weather.forecast_base_url", result);
        self.validate_url(&weather.geocoding_base_url, "weather.geocoding_base_url", result);
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Default config file location
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("aircycle");

        Ok(config_dir.join("config.toml"))
    }
}
