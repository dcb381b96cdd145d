use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenIssuer;
use auth::TokenPolicy;
use identity_service::config::RuntimeEnvironment;
use identity_service::domain::user::models::OAuthProfile;
use identity_service::domain::user::ports::OAuthProvider;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::cookies::CookiePolicy;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::inbound::http::router::RouterSettings;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::user::errors::OAuthError;
use reqwest::header::SET_COOKIE;
use serde_json::json;

pub const BASE_PATH: &str = "/api/v1/user";
pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.test/auth";
pub const VALID_GOOGLE_CODE: &str = "valid-code";

const ACCESS_SECRET: &[u8] = b"test-access-secret-for-signing-at-least-32-bytes";
const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-signing-at-least-32-bytes";

/// Google stand-in: accepts one code and returns a fixed profile.
pub struct StubOAuthProvider {
    pub profile: OAuthProfile,
}

#[async_trait]
impl OAuthProvider for StubOAuthProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("{}?state={}", GOOGLE_AUTH_URL, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, OAuthError> {
        if code == VALID_GOOGLE_CODE {
            Ok(self.profile.clone())
        } else {
            Err(OAuthError::ExchangeFailed("invalid_grant".to_string()))
        }
    }
}

/// Knobs for the spawned application
pub struct TestOptions {
    pub rotate_refresh_tokens: bool,
    pub refresh_ttl: chrono::Duration,
    pub google_profile: OAuthProfile,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            rotate_refresh_tokens: true,
            refresh_ttl: chrono::Duration::days(7),
            google_profile: OAuthProfile {
                subject: "google-subject-123456".to_string(),
                email: "gina@gmail.com".to_string(),
                email_verified: true,
                name: "Gina Google".to_string(),
            },
        }
    }
}

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    /// Keeps cookies between requests, like a browser
    pub api_client: reqwest::Client,
    /// No cookie store; for presenting specific tokens
    pub bare_client: reqwest::Client,
    pub token_issuer: Arc<TokenIssuer>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with(options: TestOptions) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_issuer = Arc::new(TokenIssuer::new(
            TokenPolicy::new(ACCESS_SECRET, chrono::Duration::minutes(15)),
            TokenPolicy::new(REFRESH_SECRET, options.refresh_ttl),
        ));

        let user_service = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&token_issuer),
            options.rotate_refresh_tokens,
        ));

        let state = AppState {
            user_service,
            token_issuer: Arc::clone(&token_issuer),
            oauth_provider: Arc::new(StubOAuthProvider {
                profile: options.google_profile,
            }),
            cookie_policy: CookiePolicy::new(
                RuntimeEnvironment::Development,
                token_issuer.refresh_ttl(),
            ),
        };
        let settings = RouterSettings {
            base_path: BASE_PATH.to_string(),
            allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
        };

        let router = create_router(state, &settings);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create reqwest client"),
            bare_client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create reqwest client"),
            token_issuer,
        }
    }

    /// Absolute URL of an API route under the base path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.address, BASE_PATH, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.bare_client.get(self.url(path)).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.bare_client.post(self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/register")
            .json(&json!({
                "fullName": full_name,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register and log in, returning (user id, access token, refresh token)
    pub async fn signed_in_user(&self, full_name: &str, email: &str) -> (String, String, String) {
        let registered: serde_json::Value = self
            .register(full_name, email, "password123")
            .await
            .json()
            .await
            .expect("Failed to parse response");

        let response = self.login(email, "password123").await;
        let refresh_token =
            set_cookie_value(&response, "refreshToken").expect("login sets refreshToken");
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");

        (
            registered["data"]["id"].as_str().unwrap().to_string(),
            body["accessToken"].as_str().unwrap().to_string(),
            refresh_token,
        )
    }

    /// POST /refresh presenting exactly `refresh_token` as the cookie
    pub async fn refresh_with(&self, refresh_token: &str) -> reqwest::Response {
        self.bare_client
            .post(self.url("/refresh"))
            .header(
                reqwest::header::COOKIE,
                format!("refreshToken={}", refresh_token),
            )
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Value of the named cookie in the response's Set-Cookie headers
pub fn set_cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    set_cookie_header(response, name)
        .and_then(|header| cookie::Cookie::parse(header).ok())
        .map(|cookie| cookie.value().to_string())
}

/// Raw Set-Cookie header for the named cookie
pub fn set_cookie_header(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

/// True if `token` has the three dot-separated segments of a JWT
pub fn is_jwt(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3 && segments.iter().all(|segment| !segment.is_empty())
}
