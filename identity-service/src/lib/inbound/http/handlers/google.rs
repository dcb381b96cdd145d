use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::Redirect;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::cookies::read_cookie;
use crate::inbound::http::cookies::set_cookies;
use crate::inbound::http::cookies::ACCESS_TOKEN_COOKIE;
use crate::inbound::http::cookies::OAUTH_STATE_COOKIE;
use crate::inbound::http::cookies::REFRESH_TOKEN_COOKIE;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const AUTHENTICATION_FAILED: &str = "Google authentication failed";

/// Start the Google flow: remember a random `state` in a short-lived cookie
/// and send the browser to the consent page.
pub async fn google_login(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Redirect), ApiError> {
    let oauth_state = Uuid::new_v4().to_string();
    let location = state.oauth_provider.authorization_url(&oauth_state);

    let headers = set_cookies([state.cookie_policy.oauth_state(oauth_state)])?;

    Ok((headers, Redirect::to(&location)))
}

/// Query string Google appends when redirecting back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoogleCallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn google_callback(
    State(state): State<AppState>,
    request_headers: HeaderMap,
    Query(params): Query<GoogleCallbackParams>,
) -> Result<(HeaderMap, ApiSuccess<GoogleLoginResponseData>), ApiError> {
    let expected = read_cookie(&request_headers, OAUTH_STATE_COOKIE);
    match (expected.as_deref(), params.state.as_deref()) {
        (Some(expected), Some(returned)) if expected == returned => {}
        _ => {
            tracing::warn!("OAuth state mismatch");
            return Err(ApiError::Unauthorized("Invalid OAuth state".to_string()));
        }
    }

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Google denied authorization");
        return Err(ApiError::Unauthorized(AUTHENTICATION_FAILED.to_string()));
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(AUTHENTICATION_FAILED.to_string()))?;

    let profile = state
        .oauth_provider
        .exchange_code(&code)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Google code exchange failed");
            ApiError::Unauthorized(AUTHENTICATION_FAILED.to_string())
        })?;

    let session = state
        .user_service
        .login_with_google(profile)
        .await
        .map_err(|e| match e {
            UserError::GoogleAccountConflict
            | UserError::UnverifiedOAuthEmail
            | UserError::InvalidEmail(_) => {
                tracing::warn!(error = %e, "Google identity rejected");
                ApiError::Unauthorized(AUTHENTICATION_FAILED.to_string())
            }
            _ => ApiError::from(e),
        })?;

    let headers = set_cookies([
        state
            .cookie_policy
            .session(ACCESS_TOKEN_COOKIE, session.tokens.access_token),
        state
            .cookie_policy
            .session(REFRESH_TOKEN_COOKIE, session.tokens.refresh_token),
        state.cookie_policy.removal(OAUTH_STATE_COOKIE),
    ])?;

    Ok((
        headers,
        ApiSuccess::with_message(
            StatusCode::OK,
            "Google Login Successful",
            GoogleLoginResponseData {
                user: (&session.user).into(),
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoogleLoginResponseData {
    pub user: UserData,
}
