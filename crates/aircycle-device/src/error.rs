//! Device-API error types.

use aircycle_core::NetworkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    /// Missing or unusable settings (DSN, position code).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Sign-in produced no usable token, or a request was still rejected
    /// after signing in again.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An expected property is absent or unreadable.
    #[error("Unexpected device state: {0}")]
    DeviceState(String),

    /// Input rejected before anything was sent.
    #[error("Invalid value: {0}")]
    Validation(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl DeviceError {
    /// Whether the loop may simply carry on and try again next cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::DeviceState(_) | Self::Validation(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Network(e) => e.is_transient(),
            Self::Configuration(_) | Self::Authentication(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(DeviceError::DeviceState("no t_temp".into()).is_transient());
        assert!(DeviceError::Network(NetworkError::Timeout).is_transient());
        assert!(DeviceError::Api {
            status: 502,
            message: String::new()
        }
        .is_transient());
        assert!(!DeviceError::Authentication("rejected".into()).is_transient());
        assert!(!DeviceError::Configuration("dsn".into()).is_transient());
    }
}
