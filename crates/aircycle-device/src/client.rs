//! Vendor device API client with token lifecycle handling.

use aircycle_core::{DeviceConfig, ReqwestErrorExt};
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::instrument;

use crate::error::DeviceError;
use crate::session::Session;
use crate::types::*;

/// Scheme name the vendor expects in the `Authorization` header.
const AUTH_SCHEME: &str = "auth_token";

/// Accepted setpoint band in °C.
pub const MIN_SETPOINT_C: f64 = 16.0;
pub const MAX_SETPOINT_C: f64 = 32.0;

/// A request against the device service, replayable after re-authentication.
#[derive(Debug, Clone)]
enum ApiRequest {
    ListProperties,
    WriteDatapoint { property: String, value: Value },
}

/// Result of one attempt, classified before any retry decision.
enum RequestOutcome {
    Success(String),
    Unauthorized,
    Failed(DeviceError),
}

/// Client for one device on the vendor cloud.
///
/// Owns the session exclusively; every operation takes `&mut self`, so a
/// clear-then-relogin can never interleave with another request.
pub struct DeviceApiClient {
    http: Client,
    config: DeviceConfig,
    session: Session,
}

impl DeviceApiClient {
    /// Build a client with the configured per-request timeout.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(config: DeviceConfig) -> Result<Self, DeviceError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DeviceError::Network(e.into_network_error()))?;

        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: DeviceConfig) -> Self {
        Self {
            http,
            config,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Make sure a usable token is held.
    ///
    /// No-op while the token is valid beyond the safety margin. Otherwise a
    /// refresh is attempted when a refresh token is held, falling back to a
    /// full sign-in.
    ///
    /// # Errors
    /// `DeviceError::Authentication` when sign-in yields no token.
    #[instrument(skip(self), level = "debug")]
    pub async fn login(&mut self) -> Result<(), DeviceError> {
        if self.session.is_valid_at(Utc::now()) {
            return Ok(());
        }

        if self.session.has_refresh_token() {
            match self.refresh().await {
                Ok(()) => return Ok(()),
                // Refresh is unreliable on this API; a full sign-in follows.
                Err(e) => tracing::warn!(error = %e, "Token refresh failed, signing in again"),
            }
        }

        self.sign_in().await
    }

    async fn sign_in(&mut self) -> Result<(), DeviceError> {
        let url = format!("{}/users/sign_in.json", self.user_base());
        let body = SignInRequest {
            user: SignInUser {
                email: &self.config.username,
                password: &self.config.password,
                application: Application {
                    app_id: &self.config.app_id,
                    app_secret: &self.config.app_secret,
                },
            },
        };

        let tokens = self.request_tokens(self.http.post(&url).json(&body)).await?;
        self.session.apply(tokens, Utc::now())?;

        tracing::info!(
            user = %self.config.username,
            expiry = ?self.session.expiry(),
            "Signed in to device cloud"
        );
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), DeviceError> {
        let url = format!("{}/users/refresh_token.json", self.user_base());
        let body = RefreshRequest {
            user: RefreshUser {
                refresh_token: self.session.refresh_token(),
            },
        };

        let tokens = self.request_tokens(self.http.post(&url).json(&body)).await?;
        self.session.apply(tokens, Utc::now())?;

        tracing::info!(expiry = ?self.session.expiry(), "Refreshed access token");
        Ok(())
    }

    async fn request_tokens(&self, request: RequestBuilder) -> Result<TokenResponse, DeviceError> {
        let response = request
            .send()
            .await
            .map_err(|e| DeviceError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DeviceError::Authentication(format!("{}: {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| DeviceError::Authentication(format!("unreadable token response: {}", e)))
    }

    /// All properties of the configured device.
    #[instrument(skip(self), level = "info")]
    pub async fn get_properties(&mut self) -> Result<Vec<DeviceProperty>, DeviceError> {
        let body = self.execute(ApiRequest::ListProperties).await?;

        let envelopes: Vec<PropertyEnvelope> = serde_json::from_str(&body).map_err(|e| {
            DeviceError::Network(aircycle_core::NetworkError::InvalidResponse(e.to_string()))
        })?;

        Ok(envelopes.into_iter().map(|e| e.property).collect())
    }

    /// A single property by name, `None` when the device does not list it.
    #[instrument(skip(self), level = "info")]
    pub async fn get_property(&mut self, name: &str) -> Result<Option<DeviceProperty>, DeviceError> {
        let properties = self.get_properties().await?;
        Ok(properties.into_iter().find(|p| p.name == name))
    }

    /// Write a datapoint for `name`.
    #[instrument(skip(self), level = "info")]
    pub async fn set_property(&mut self, name: &str, value: Value) -> Result<(), DeviceError> {
        self.execute(ApiRequest::WriteDatapoint {
            property: name.to_string(),
            value,
        })
        .await?;
        Ok(())
    }

    /// Current louver position code.
    ///
    /// Units that do not report the property are treated as automatic
    /// (`"0"`).
    pub async fn get_louver_position(&mut self) -> Result<String, DeviceError> {
        let name = PropertyName::VerticalLouver;
        let property = self.get_property(name.as_str()).await?;

        match property.and_then(|p| p.value_as_string()) {
            Some(position) => {
                tracing::info!(position = %position, "Read louver position");
                Ok(position)
            }
            None => {
                tracing::warn!(
                    property = %name,
                    "Louver property missing, assuming automatic"
                );
                Ok(DEFAULT_LOUVER_POSITION.to_string())
            }
        }
    }

    /// Command the louver to `code`.
    ///
    /// # Errors
    /// `DeviceError::Configuration` for an empty DSN or code.
    pub async fn set_louver_position(&mut self, code: &str) -> Result<(), DeviceError> {
        let code = code.trim();
        if self.config.dsn.trim().is_empty() {
            return Err(DeviceError::Configuration("device DSN is empty".into()));
        }
        if code.is_empty() {
            return Err(DeviceError::Configuration("louver position code is empty".into()));
        }

        let value = code
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(code));

        self.set_property(PropertyName::VerticalLouver.as_str(), value)
            .await?;
        tracing::info!(position = code, "Set louver position");
        Ok(())
    }

    /// Current setpoint in °C, from the first known temperature property.
    ///
    /// # Errors
    /// `DeviceError::DeviceState` when no candidate property is present or
    /// its value is not numeric.
    pub async fn get_temperature(&mut self) -> Result<f64, DeviceError> {
        let properties = self.get_properties().await?;

        for candidate in PropertyName::TEMPERATURE_CANDIDATES {
            let Some(property) = properties.iter().find(|p| p.name == candidate.as_str()) else {
                continue;
            };

            return match property.value_as_f64() {
                Some(celsius) => {
                    tracing::info!(property = %candidate, celsius, "Read temperature setpoint");
                    Ok(celsius)
                }
                None => Err(DeviceError::DeviceState(format!(
                    "{} has non-numeric value {}",
                    candidate, property.value
                ))),
            };
        }

        Err(DeviceError::DeviceState(
            "no temperature setpoint property found".into(),
        ))
    }

    /// Write a new setpoint, trying each known property name in turn.
    ///
    /// Returns the property that accepted the write.
    ///
    /// # Errors
    /// `DeviceError::Validation` outside the accepted band (nothing is sent),
    /// `DeviceError::DeviceState` when every candidate fails.
    pub async fn set_temperature(&mut self, celsius: f64) -> Result<PropertyName, DeviceError> {
        if !(MIN_SETPOINT_C..=MAX_SETPOINT_C).contains(&celsius) {
            return Err(DeviceError::Validation(format!(
                "setpoint {} °C outside {}..={} °C",
                celsius, MIN_SETPOINT_C, MAX_SETPOINT_C
            )));
        }

        let mut last_error = None;
        for candidate in PropertyName::TEMPERATURE_CANDIDATES {
            match self.set_property(candidate.as_str(), Value::from(celsius)).await {
                Ok(()) => {
                    tracing::info!(property = %candidate, celsius, "Set temperature setpoint");
                    return Ok(candidate);
                }
                Err(e @ DeviceError::Authentication(_)) => return Err(e),
                Err(e) => {
                    tracing::debug!(property = %candidate, error = %e, "Setpoint write rejected");
                    last_error = Some(e);
                }
            }
        }

        Err(DeviceError::DeviceState(format!(
            "no temperature property accepted the write (last error: {})",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Run a request with at most one re-authentication.
    ///
    /// A 401 clears the whole session, forcing a full sign-in, and the
    /// request is replayed once. A second 401 is final.
    async fn execute(&mut self, request: ApiRequest) -> Result<String, DeviceError> {
        self.login().await?;

        match self.dispatch(&request).await {
            RequestOutcome::Success(body) => return Ok(body),
            RequestOutcome::Failed(e) => return Err(e),
            RequestOutcome::Unauthorized => {}
        }

        tracing::warn!(?request, "Token rejected, clearing session and signing in again");
        self.session.clear();
        self.login().await?;

        match self.dispatch(&request).await {
            RequestOutcome::Success(body) => Ok(body),
            RequestOutcome::Unauthorized => Err(DeviceError::Authentication(
                "request rejected again after signing in".into(),
            )),
            RequestOutcome::Failed(e) => Err(e),
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> RequestOutcome {
        let dsn = self.config.dsn.trim();
        if dsn.is_empty() {
            return RequestOutcome::Failed(DeviceError::Configuration("device DSN is empty".into()));
        }

        let builder = match request {
            ApiRequest::ListProperties => {
                let url = format!("{}/apiv1/dsns/{}/properties.json", self.ads_base(), dsn);
                self.http.get(url)
            }
            ApiRequest::WriteDatapoint { property, value } => {
                let url = format!(
                    "{}/apiv1/dsns/{}/properties/{}/datapoints.json",
                    self.ads_base(),
                    dsn,
                    property
                );
                self.http.post(url).json(&DatapointRequest {
                    datapoint: Datapoint {
                        value: value.clone(),
                    },
                })
            }
        };

        let response = match builder
            .header("Authorization", self.auth_header())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return RequestOutcome::Failed(DeviceError::Network(e.into_network_error())),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return RequestOutcome::Unauthorized;
        }

        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            RequestOutcome::Success(text)
        } else {
            RequestOutcome::Failed(DeviceError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    fn auth_header(&self) -> String {
        format!("{} {}", AUTH_SCHEME, self.session.access_token())
    }

    fn user_base(&self) -> &str {
        self.config.user_base_url.trim_end_matches('/')
    }

    fn ads_base(&self) -> &str {
        self.config.ads_base_url.trim_end_matches('/')
    }
}
