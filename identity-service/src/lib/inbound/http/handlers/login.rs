use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::body_or_default;
use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::cookies::set_cookies;
use crate::inbound::http::router::AppState;

/// Password login. The refresh token only travels in the HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(HeaderMap, ApiSuccess<LoginResponseData>), ApiError> {
    let body = body_or_default(body);

    let session = state
        .user_service
        .login(
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let headers = set_cookies([state
        .cookie_policy
        .refresh_token(session.tokens.refresh_token)])?;

    Ok((
        headers,
        ApiSuccess::with_message(
            StatusCode::OK,
            "User Logged In Successfully",
            LoginResponseData {
                access_token: session.tokens.access_token,
                user: (&session.user).into(),
            },
        ),
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub access_token: String,
    pub user: UserData,
}
