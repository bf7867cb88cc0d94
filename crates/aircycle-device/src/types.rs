//! Property names and wire shapes of the vendor device API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position reported when the unit does not expose the louver property.
pub const DEFAULT_LOUVER_POSITION: &str = "0";

/// Device properties the client knows how to use.
///
/// The vendor does not use one canonical name for the temperature setpoint,
/// so there are several candidates tried in `TEMPERATURE_CANDIDATES` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyName {
    VerticalLouver,
    TargetTemperature,
    TargetTemperatureSet,
    SetTemperature,
}

impl PropertyName {
    pub const TEMPERATURE_CANDIDATES: [PropertyName; 3] = [
        PropertyName::TargetTemperature,
        PropertyName::TargetTemperatureSet,
        PropertyName::SetTemperature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VerticalLouver => "t_fan_vertical",
            Self::TargetTemperature => "t_temp",
            Self::TargetTemperatureSet => "t_temp_set",
            Self::SetTemperature => "set_temp",
        }
    }
}

impl std::fmt::Display for PropertyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named property as listed by the device API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProperty {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl DeviceProperty {
    /// Value rendered as text; `None` for null or structured values.
    pub fn value_as_string(&self) -> Option<String> {
        match &self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Value as a number, accepting numeric strings.
    pub fn value_as_f64(&self) -> Option<f64> {
        match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// `GET .../properties` wraps each entry as `{"property": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PropertyEnvelope {
    pub property: DeviceProperty,
}

/// Token payload returned by sign-in and refresh.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub user: SignInUser<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignInUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub application: Application<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Application<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub user: RefreshUser<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshUser<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DatapointRequest {
    pub datapoint: Datapoint,
}

#[derive(Debug, Serialize)]
pub(crate) struct Datapoint {
    pub value: Value,
}
