//! Authentication utilities library
//!
//! Provides the credential primitives used by the identity service:
//! - Password hashing (Argon2id)
//! - JWT encoding and validation
//! - Access/refresh token issuance
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{TokenIssuer, TokenPolicy};
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(
//!     TokenPolicy::new("access_secret_at_least_32_bytes_long!", Duration::minutes(15)),
//!     TokenPolicy::new("refresh_secret_at_least_32_bytes_long", Duration::days(7)),
//! );
//!
//! let pair = issuer.issue_pair("user123", "alice@example.com", "Alice").unwrap();
//! let claims = issuer.verify_access(&pair.access_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert!(issuer.verify_refresh(&pair.refresh_token).is_ok());
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::TokenIssuer;
pub use issuer::TokenPair;
pub use issuer::TokenPolicy;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
