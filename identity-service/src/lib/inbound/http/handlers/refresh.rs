use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::cookies::read_cookie;
use crate::inbound::http::cookies::set_cookies;
use crate::inbound::http::cookies::REFRESH_TOKEN_COOKIE;
use crate::inbound::http::router::AppState;

/// Trade the `refreshToken` cookie for a new access token. When rotation is
/// enabled the cookie is replaced as well.
pub async fn refresh(
    State(state): State<AppState>,
    request_headers: HeaderMap,
) -> Result<(HeaderMap, ApiSuccess<RefreshResponseData>), ApiError> {
    let presented = read_cookie(&request_headers, REFRESH_TOKEN_COOKIE);

    let refreshed = state.user_service.refresh(presented.as_deref()).await?;

    let headers = set_cookies(
        refreshed
            .refresh_token
            .map(|token| state.cookie_policy.refresh_token(token)),
    )?;

    Ok((
        headers,
        ApiSuccess::new(
            StatusCode::OK,
            RefreshResponseData {
                access_token: refreshed.access_token,
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponseData {
    pub access_token: String,
}
