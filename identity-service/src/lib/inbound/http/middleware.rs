use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::cookies::read_cookie;
use super::cookies::ACCESS_TOKEN_COOKIE;
use super::handlers::ApiError;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

const TOKEN_REQUIRED: &str = "Access token is required";
const TOKEN_INVALID: &str = "Invalid or expired access token";

/// Identity of the caller, inserted into request extensions by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
}

/// Access Guard: validates the access token and records the caller.
///
/// The token comes from `Authorization: Bearer`, falling back to the
/// `accessToken` cookie set by the Google flow. Refresh tokens are rejected.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized(TOKEN_REQUIRED.to_string()))?;

    let claims = state.token_issuer.verify_access(&token).map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        ApiError::Unauthorized(TOKEN_INVALID.to_string())
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Access token carries a malformed subject");
        ApiError::Unauthorized(TOKEN_INVALID.to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email().unwrap_or_default().to_string(),
        full_name: claims.full_name().unwrap_or_default().to_string(),
    });

    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    bearer.or_else(|| read_cookie(headers, ACCESS_TOKEN_COOKIE).filter(|t| !t.is_empty()))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("accessToken=from-cookie"));

        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("accessToken=from-cookie"));

        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
