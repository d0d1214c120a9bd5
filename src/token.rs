use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body returned by the OAuth token endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub x_refresh_token_expires_in: Option<i64>,
}

/// Access/refresh token pair owned by a single connector run.
///
/// A state with no recorded expiry is stale: an access token of unknown age
/// is never used.
#[derive(Clone, Default)]
pub struct TokenState {
    access_token: Option<String>,
    refresh_token: String,
    expires_at: Option<i64>,
    rotated: bool,
    rotated_refresh_token: Option<String>,
}

impl TokenState {
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            ..Default::default()
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Expiry of the current access token, in epoch seconds.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    pub fn rotated(&self) -> bool {
        self.rotated
    }

    /// The refresh token issued by the last rotation, for the caller to persist.
    pub fn rotated_refresh_token(&self) -> Option<&str> {
        self.rotated_refresh_token.as_deref()
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now().timestamp())
    }

    pub fn is_stale_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }

    /// Records a successful exchange made at `now`.
    pub fn apply(&mut self, response: &TokenResponse, now: i64) {
        self.access_token = Some(response.access_token.clone());
        self.expires_at = Some(now.saturating_add(response.expires_in));

        if let Some(new_refresh) = response.refresh_token.as_deref() {
            if !new_refresh.is_empty() && new_refresh != self.refresh_token {
                self.refresh_token = new_refresh.to_string();
                self.rotated = true;
                self.rotated_refresh_token = Some(new_refresh.to_string());
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn with_expiry(mut self, access_token: &str, expires_at: Option<i64>) -> Self {
        self.access_token = Some(access_token.to_string());
        self.expires_at = expires_at;
        self
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("rotated", &self.rotated)
            .finish()
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("expires_in", &self.expires_in)
            .field("refresh_token_present", &self.refresh_token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(refresh_token: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "access-1".to_string(),
            expires_in: 3600,
            refresh_token: refresh_token.map(str::to_string),
            x_refresh_token_expires_in: None,
        }
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now().timestamp();

        assert!(TokenState::new("r").is_stale());
        assert!(TokenState::new("r").with_expiry("a", Some(now - 1)).is_stale());
        assert!(!TokenState::new("r").with_expiry("a", Some(now + 3600)).is_stale());
    }

    #[test]
    fn test_staleness_boundary_is_inclusive() {
        let state = TokenState::new("r").with_expiry("a", Some(1_000));
        assert!(!state.is_stale_at(999));
        assert!(state.is_stale_at(1_000));
    }

    #[test]
    fn test_apply_records_expiry_without_rotation() {
        let mut state = TokenState::new("refresh-1");
        state.apply(&response(Some("refresh-1")), 1_000);

        assert_eq!(state.access_token(), Some("access-1"));
        assert_eq!(state.expires_at(), Some(4_600));
        assert!(!state.rotated());
        assert_eq!(state.rotated_refresh_token(), None);
        assert!(!state.is_stale_at(4_599));
    }

    #[test]
    fn test_apply_saturates_huge_lifetime() {
        let mut state = TokenState::new("refresh-1");
        let huge = TokenResponse {
            expires_in: i64::MAX,
            ..response(None)
        };
        state.apply(&huge, 1_700_000_000);

        assert_eq!(state.expires_at(), Some(i64::MAX));
        assert!(!state.is_stale_at(1_700_000_001));
    }

    #[test]
    fn test_apply_tracks_rotation() {
        let mut state = TokenState::new("refresh-1");
        state.apply(&response(Some("refresh-2")), 0);

        assert!(state.rotated());
        assert_eq!(state.refresh_token(), "refresh-2");
        assert_eq!(state.rotated_refresh_token(), Some("refresh-2"));

        state.apply(&response(None), 10);
        assert!(state.rotated());
        assert_eq!(state.refresh_token(), "refresh-2");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let state = TokenState::new("secret-refresh").with_expiry("secret-access", Some(1));
        let rendered = format!("{:?}", state);
        assert!(!rendered.contains("secret"));
    }
}
