use crate::config::{OAuthCredentials, TOKEN_ENDPOINT};
use crate::error::{ReportError, Result};
use crate::token::{TokenResponse, TokenState};
use chrono::Utc;
use log::{debug, warn};
use reqwest::Client;

/// Keeps an access token usable by exchanging the refresh token when needed.
///
/// Refreshing takes `&mut self`, so one refresher can never have two exchanges
/// in flight; a refresh may rotate the very refresh token the next one needs.
/// The rotated value is exposed through [`TokenRefresher::state`] for the
/// caller to persist; nothing is written anywhere by this type.
pub struct TokenRefresher {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    state: TokenState,
}

impl TokenRefresher {
    pub fn new(credentials: &OAuthCredentials) -> Self {
        Self::with_client(Client::new(), credentials)
    }

    pub fn with_client(client: Client, credentials: &OAuthCredentials) -> Self {
        Self {
            client,
            token_url: TOKEN_ENDPOINT.to_string(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            state: TokenState::new(credentials.refresh_token.clone()),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn state(&self) -> &TokenState {
        &self.state
    }

    pub fn is_stale(&self) -> bool {
        self.state.is_stale()
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// Returns the access token and its lifetime in seconds.
    pub async fn refresh(&mut self) -> Result<(String, i64)> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.state.refresh_token()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let res = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&params[..])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await?;
            return Err(ReportError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.text().await?;
        let response: TokenResponse = serde_json::from_str(&body)?;

        let was_rotated = self.state.rotated_refresh_token().map(str::to_string);
        self.state.apply(&response, Utc::now().timestamp());

        debug!(
            "Access token refreshed; expires in {}s",
            response.expires_in
        );
        if let Some(refresh_lifetime) = response.x_refresh_token_expires_in {
            debug!("Refresh token valid for another {}s", refresh_lifetime);
        }
        if self.state.rotated_refresh_token() != was_rotated.as_deref() {
            warn!("Refresh token was rotated by the token endpoint; the new value must be persisted");
        }

        Ok((response.access_token, response.expires_in))
    }

    /// Current access token, refreshing first when stale.
    pub async fn access_token(&mut self) -> Result<String> {
        if self.state.is_stale() {
            self.refresh().await?;
        }

        self.state
            .access_token()
            .map(str::to_string)
            .ok_or_else(|| ReportError::Auth {
                status: 0,
                body: "No access token available after refresh".to_string(),
            })
    }
}
