use chrono::{DateTime, Duration, Utc};

use crate::error::DeviceError;
use crate::types::TokenResponse;

/// Lifetime assumed when the server omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Tokens are treated as expired this long before their nominal expiry.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 300;

/// In-memory credentials for the vendor API.
///
/// Empty strings mean "absent". `expiry` is always set while an access
/// token is held.
#[derive(Clone, Default)]
pub struct Session {
    access_token: String,
    refresh_token: String,
    expiry: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usable at `now`: a token is held and it stays valid for more than
    /// the safety margin.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            Some(expiry) => now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < expiry,
            None => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Store a sign-in or refresh result received at `now`.
    ///
    /// A missing refresh token keeps the one already held.
    ///
    /// # Errors
    /// `DeviceError::Authentication` when the payload carries no access
    /// token or an `expires_in` that does not fit a timestamp; the session is
    /// left untouched in that case.
    pub fn apply(&mut self, tokens: TokenResponse, now: DateTime<Utc>) -> Result<(), DeviceError> {
        let access_token = tokens
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DeviceError::Authentication("response contained no access token".into()))?;

        let lifetime = tokens.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let expiry = Duration::try_seconds(lifetime)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                DeviceError::Authentication(format!("token lifetime {}s out of range", lifetime))
            })?;

        self.access_token = access_token;
        if let Some(refresh) = tokens.refresh_token.filter(|t| !t.is_empty()) {
            self.refresh_token = refresh;
        }
        self.expiry = Some(expiry);
        Ok(())
    }

    /// Forget everything so the next login is a full sign-in.
    pub fn clear(&mut self) {
        self.access_token.clear();
        self.refresh_token.clear();
        self.expiry = None;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("has_refresh_token", &self.has_refresh_token())
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn tokens(expires_in: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            expires_in,
        }
    }

    #[test]
    fn test_empty_session_is_invalid() {
        let session = Session::new();
        assert!(!session.is_valid());
        assert!(!session.is_authenticated());
        assert!(session.expiry().is_none());
    }

    #[test]
    fn test_token_expiring_in_four_minutes_is_invalid() {
        let now = Utc::now();
        let mut session = Session::new();
        session.apply(tokens(Some(4 * 60)), now).unwrap();
        assert!(!session.is_valid_at(now));
    }

    #[test]
    fn test_token_expiring_in_six_minutes_is_valid() {
        let now = Utc::now();
        let mut session = Session::new();
        session.apply(tokens(Some(6 * 60)), now).unwrap();
        assert!(session.is_valid_at(now));
    }

    #[test]
    fn test_token_at_exact_margin_is_invalid() {
        let now = Utc::now();
        let mut session = Session::new();
        session.apply(tokens(Some(TOKEN_EXPIRY_MARGIN_SECS)), now).unwrap();
        assert!(!session.is_valid_at(now));
    }

    #[test]
    fn test_default_lifetime() {
        let now = Utc::now();
        let mut session = Session::new();
        session.apply(tokens(None), now).unwrap();
        assert_eq!(
            session.expiry(),
            Some(now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS))
        );
    }

    #[test]
    fn test_missing_access_token_rejected() {
        let now = Utc::now();
        let mut session = Session::new();
        let result = session.apply(TokenResponse::default(), now);
        assert!(matches!(result, Err(DeviceError::Authentication(_))));
        assert!(!session.is_authenticated());

        let result = session.apply(
            TokenResponse {
                access_token: Some(String::new()),
                ..TokenResponse::default()
            },
            now,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_lifetime_rejected() {
        let now = Utc::now();
        let mut session = Session::new();
        session.apply(tokens(None), now).unwrap();

        for expires_in in [i64::MAX / 10, i64::MAX, i64::MIN] {
            let result = session.apply(
                TokenResponse {
                    access_token: Some("other".into()),
                    refresh_token: None,
                    expires_in: Some(expires_in),
                },
                now,
            );
            assert!(matches!(result, Err(DeviceError::Authentication(_))));
        }

        assert_eq!(session.access_token(), "access");
        assert_eq!(
            session.expiry(),
            Some(now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS))
        );
    }

    #[test]
    fn test_refresh_without_new_refresh_token_keeps_old_one() {
        let now = Utc::now();
        let mut session = Session::new();
        session.apply(tokens(None), now).unwrap();
        session
            .apply(
                TokenResponse {
                    access_token: Some("access2".into()),
                    refresh_token: None,
                    expires_in: Some(60),
                },
                now,
            )
            .unwrap();
        assert_eq!(session.access_token(), "access2");
        assert_eq!(session.refresh_token(), "refresh");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = Session::new();
        session.apply(tokens(None), Utc::now()).unwrap();
        session.clear();
        assert!(!session.is_authenticated());
        assert!(!session.has_refresh_token());
        assert!(session.expiry().is_none());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let mut session = Session::new();
        session.apply(tokens(None), Utc::now()).unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("access"));
        assert!(debug.contains("authenticated: true"));
    }
}
