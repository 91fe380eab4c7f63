use crate::types::OAuthConfig;

/// WHOOP OAuth endpoints.
pub const AUTH_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/auth";
pub const TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";

/// Scopes requested during authorization. `offline` is what gets us a
/// refresh token.
pub const SCOPES: [&str; 6] = [
    "read:recovery",
    "read:cycles",
    "read:workout",
    "read:sleep",
    "read:profile",
    "offline",
];

const DEFAULT_CALLBACK_PORT: u16 = 8080;

/// Build the WHOOP OAuth configuration from stored client credentials.
pub fn whoop_oauth_config(client_id: &str, client_secret: &str, redirect_uri: &str) -> OAuthConfig {
    OAuthConfig {
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        auth_url: AUTH_URL.to_string(),
        token_url: TOKEN_URL.to_string(),
        redirect_uri: redirect_uri.to_string(),
        scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Port the local callback listener binds, taken from the registered
/// redirect URI so the two cannot drift apart.
pub fn callback_port(redirect_uri: &str) -> u16 {
    url::Url::parse(redirect_uri)
        .ok()
        .and_then(|u| u.port())
        .unwrap_or(DEFAULT_CALLBACK_PORT)
}
