pub mod config;
pub mod error;
pub mod louver;

pub use config::{
    Config, DeviceConfig, LoggingConfig, LouverConfig, ValidationResult, WeatherConfig,
};
pub use error::{ConfigError, NetworkError, ReqwestErrorExt};
pub use louver::LouverPosition;

use anyhow::Result;

/// Initialize tracing for the daemon.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` (from the
/// `logging.level` setting) applies to every target.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("aircycle core initialized");
    Ok(())
}
