use anyhow::Context;
use rand::{Rng, distr::Alphanumeric};

use crate::types::{AuthRequest, OAuthConfig, OAuthTokens};

/// Drives the authorization-code flow against a single provider: builds the
/// authorization URL, exchanges the callback code, and refreshes expired
/// access tokens.
pub struct OAuthFlow {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthFlow {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build the authorization URL with a fresh anti-forgery state token.
    /// The state is returned alongside the URL so the caller can hand it to
    /// the callback listener.
    pub fn start(&self) -> anyhow::Result<AuthRequest> {
        let state: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let mut url =
            url::Url::parse(&self.config.auth_url).context("invalid authorization URL")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", &state)
            .append_pair("response_type", "code");

        Ok(AuthRequest {
            url: url.into(),
            state,
        })
    }

    /// Exchange an authorization code for tokens. A non-success status from
    /// the token endpoint is a hard error.
    pub async fn exchange(&self, code: &str) -> anyhow::Result<OAuthTokens> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];
        self.post_token(&params)
            .await
            .context("authorization code exchange failed")
    }

    /// Obtain a fresh token pair from a refresh token.
    ///
    /// Fails on a non-success response so callers never overwrite working
    /// tokens with the nulls of a rejected refresh.
    pub async fn refresh(&self, refresh_token: &str) -> anyhow::Result<OAuthTokens> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", "offline"),
            ("refresh_token", refresh_token),
        ];
        self.post_token(&params).await.context("token refresh failed")
    }

    async fn post_token(&self, params: &[(&str, &str)]) -> anyhow::Result<OAuthTokens> {
        let resp = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("token endpoint returned {status}: {body}");
        }

        Ok(resp.json::<OAuthTokens>().await?)
    }
}
