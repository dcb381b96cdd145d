use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::CookiePolicy;
use super::handlers::google::google_callback;
use super::handlers::google::google_login;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::ports::OAuthProvider;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub token_issuer: Arc<TokenIssuer>,
    pub oauth_provider: Arc<dyn OAuthProvider>,
    pub cookie_policy: CookiePolicy,
}

/// Where the API is mounted and who may call it from a browser.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub base_path: String,
    pub allowed_origins: Vec<String>,
}

pub fn create_router(state: AppState, settings: &RouterSettings) -> Router {
    let public_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/google", get(google_login))
        .route("/google/callback", get(google_callback));

    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/list", get(list_users))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    let base_path = settings.base_path.trim_end_matches('/');
    let routes = if base_path.is_empty() {
        Router::new().route("/", get(health)).merge(api_routes)
    } else {
        Router::new()
            .route("/", get(health))
            .nest(base_path, api_routes)
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    routes
        .layer(trace_layer)
        .layer(cors_layer(&settings.allowed_origins))
        .with_state(state)
}

async fn health() -> &'static str {
    "API is running"
}

/// Credentialed CORS restricted to the configured origins.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::config::RuntimeEnvironment;
    use crate::domain::user::models::OAuthProfile;
    use crate::domain::user::service::UserService;
    use crate::outbound::repositories::InMemoryUserRepository;
    use crate::user::errors::OAuthError;

    struct RejectingOAuthProvider;

    #[async_trait::async_trait]
    impl OAuthProvider for RejectingOAuthProvider {
        fn authorization_url(&self, state: &str) -> String {
            format!("https://accounts.google.test/auth?state={}", state)
        }

        async fn exchange_code(&self, _code: &str) -> Result<OAuthProfile, OAuthError> {
            Err(OAuthError::ExchangeFailed("unused".to_string()))
        }
    }

    fn router(base_path: &str) -> Router {
        let token_issuer = Arc::new(TokenIssuer::new(
            auth::TokenPolicy::new(
                "access_secret_at_least_32_bytes_long!",
                chrono::Duration::minutes(15),
            ),
            auth::TokenPolicy::new(
                "refresh_secret_at_least_32_bytes_long",
                chrono::Duration::days(7),
            ),
        ));
        let state = AppState {
            user_service: Arc::new(UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::clone(&token_issuer),
                true,
            )),
            cookie_policy: CookiePolicy::new(
                RuntimeEnvironment::Development,
                token_issuer.refresh_ttl(),
            ),
            token_issuer,
            oauth_provider: Arc::new(RejectingOAuthProvider),
        };

        create_router(
            state,
            &RouterSettings {
                base_path: base_path.to_string(),
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
        )
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_at_root() {
        let response = router("/api/v1/user").oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"API is running");
    }

    #[tokio::test]
    async fn test_routes_nested_under_base_path() {
        let response = router("/api/v1/user")
            .oneshot(get("/api/v1/user/list"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router("/api/v1/user").oneshot(get("/list")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_base_path_mounts_at_root() {
        let response = router("").oneshot(get("/list")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
