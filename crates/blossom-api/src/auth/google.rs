use anyhow::Context;
use reqwest::Url;
use serde::Deserialize;

use crate::config::GoogleConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// The subset of Google's OpenID userinfo we keep.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account id.
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Consent-screen URL asking for the `profile` and `email` scopes.
pub fn authorize_url(config: &GoogleConfig, state: &str) -> anyhow::Result<Url> {
    let url = Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.callback_url.as_str()),
            ("response_type", "code"),
            ("scope", "profile email"),
            ("state", state),
        ],
    )?;
    Ok(url)
}

/// Trade an authorization code for an access token, then fetch the profile it grants.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &GoogleConfig,
    code: &str,
) -> anyhow::Result<GoogleProfile> {
    let token: TokenResponse = http
        .post(TOKEN_URL)
        .form(&[
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .context("token request failed")?
        .error_for_status()
        .context("token endpoint rejected the code")?
        .json()
        .await
        .context("malformed token response")?;

    let profile = http
        .get(USERINFO_URL)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .context("userinfo request failed")?
        .error_for_status()
        .context("userinfo endpoint rejected the token")?
        .json()
        .await
        .context("malformed userinfo response")?;

    Ok(profile)
}
