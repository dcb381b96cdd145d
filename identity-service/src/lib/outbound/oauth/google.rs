//! Google OAuth2 authorization code flow.
//!
//! 1. Build the consent URL the browser is redirected to
//! 2. Exchange the returned code for a Google access token
//! 3. Fetch the user's profile from the userinfo endpoint

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::domain::user::models::OAuthProfile;
use crate::domain::user::ports::OAuthProvider;
use crate::user::errors::OAuthError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SCOPES: &str = "openid email profile";

/// Google OAuth2 client for authorization code flow
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Subset of Google's userinfo response
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
}

impl From<GoogleUserInfo> for OAuthProfile {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            subject: info.sub,
            email: info.email,
            email_verified: info.email_verified,
            name: info.name.unwrap_or_default(),
        }
    }
}

impl GoogleOAuthClient {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, OAuthError> {
        let token_response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?;

        if !token_response.status().is_success() {
            let status = token_response.status();
            let body = token_response.text().await.unwrap_or_default();
            return Err(OAuthError::ExchangeFailed(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = token_response
            .json()
            .await
            .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?;

        let userinfo_response = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::ProfileFailed(e.to_string()))?;

        if !userinfo_response.status().is_success() {
            let status = userinfo_response.status();
            let body = userinfo_response.text().await.unwrap_or_default();
            return Err(OAuthError::ProfileFailed(format!("{}: {}", status, body)));
        }

        let user_info: GoogleUserInfo = userinfo_response
            .json()
            .await
            .map_err(|e| OAuthError::ProfileFailed(e.to_string()))?;

        Ok(user_info.into())
    }
}
