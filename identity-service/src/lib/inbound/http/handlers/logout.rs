use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::NoData;
use crate::inbound::http::cookies::set_cookies;
use crate::inbound::http::cookies::ACCESS_TOKEN_COOKIE;
use crate::inbound::http::cookies::REFRESH_TOKEN_COOKIE;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<(HeaderMap, ApiSuccess<NoData>), ApiError> {
    // Any failure here is reported as a 400 with a generic message.
    state
        .user_service
        .logout(&user.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user.user_id, "Logout failed");
            ApiError::BadRequest("Internal Server Error".to_string())
        })?;

    let headers = set_cookies([
        state.cookie_policy.removal(REFRESH_TOKEN_COOKIE),
        state.cookie_policy.removal(ACCESS_TOKEN_COOKIE),
    ])?;

    Ok((
        headers,
        ApiSuccess::with_message(StatusCode::OK, "User Logged Out Successfully", NoData {}),
    ))
}
