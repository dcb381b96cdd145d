use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use cookie::time::Duration;
use cookie::Cookie;
use cookie::SameSite;

use super::handlers::ApiError;
use crate::config::RuntimeEnvironment;

pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const OAUTH_STATE_COOKIE: &str = "oauthState";

const OAUTH_STATE_MAX_AGE_MINUTES: i64 = 10;

/// Attributes applied to every cookie the service sets.
///
/// Production cookies are `Secure; SameSite=None` so a cross-site frontend
/// can send them; elsewhere they are `SameSite=Lax` over plain HTTP.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
    refresh_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(environment: RuntimeEnvironment, refresh_ttl: chrono::Duration) -> Self {
        let production = environment == RuntimeEnvironment::Production;

        Self {
            secure: production,
            same_site: if production {
                SameSite::None
            } else {
                SameSite::Lax
            },
            refresh_max_age: Duration::seconds(refresh_ttl.num_seconds()),
        }
    }

    /// Refresh token cookie that outlives the browser session.
    pub fn refresh_token(&self, token: String) -> Cookie<'static> {
        Cookie::build((REFRESH_TOKEN_COOKIE, token))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .max_age(self.refresh_max_age)
            .build()
    }

    /// Cookie without Max-Age, dropped when the browser closes.
    pub fn session(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .build()
    }

    /// Short-lived OAuth `state` cookie. Always Lax: it has to survive the
    /// top-level redirect back from the provider.
    pub fn oauth_state(&self, state: String) -> Cookie<'static> {
        Cookie::build((OAUTH_STATE_COOKIE, state))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::minutes(OAUTH_STATE_MAX_AGE_MINUTES))
            .build()
    }

    /// Cookie that makes the browser drop `name`.
    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .build();
        cookie.make_removal();
        cookie
    }
}

/// Render cookies as `Set-Cookie` headers.
pub fn set_cookies<I>(cookies: I) -> Result<HeaderMap, ApiError>
where
    I: IntoIterator<Item = Cookie<'static>>,
{
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        let value = HeaderValue::from_str(&cookie.to_string()).map_err(|e| {
            tracing::error!(error = %e, cookie = cookie.name(), "Unencodable cookie");
            ApiError::internal()
        })?;
        headers.append(header::SET_COOKIE, value);
    }
    Ok(headers)
}

/// Value of the named cookie in the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| Cookie::parse(pair.trim()).ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
