use std::collections::HashMap;
use std::fmt;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Kind of credential a token represents.
///
/// Serialized into the `typ` claim so an access token can never be accepted
/// where a refresh token is expected, and the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Session token claims.
///
/// Every token carries a subject, its kind, issue/expiry timestamps and a
/// unique `jti`. Profile data (email, full name) goes into `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Token kind
    pub typ: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier, keeps two tokens issued in the same second distinct
    pub jti: String,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    const EMAIL: &'static str = "email";
    const FULL_NAME: &'static str = "fullName";

    /// Create claims for `subject` that expire `ttl` from now.
    pub fn new(kind: TokenKind, subject: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.to_string(),
            typ: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            extra: HashMap::new(),
        }
    }

    fn with_text(mut self, key: &str, value: &str) -> Self {
        self.extra
            .insert(key.to_string(), serde_json::Value::String(value.to_string()));
        self
    }

    pub fn with_email(self, email: &str) -> Self {
        self.with_text(Self::EMAIL, email)
    }

    pub fn with_full_name(self, full_name: &str) -> Self {
        self.with_text(Self::FULL_NAME, full_name)
    }

    pub fn email(&self) -> Option<&str> {
        self.extra.get(Self::EMAIL).and_then(|v| v.as_str())
    }

    pub fn full_name(&self) -> Option<&str> {
        self.extra.get(Self::FULL_NAME).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_lifetime() {
        let claims = Claims::new(TokenKind::Access, "user123", Duration::minutes(15));

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_jti_is_unique() {
        let first = Claims::new(TokenKind::Refresh, "user123", Duration::days(7));
        let second = Claims::new(TokenKind::Refresh, "user123", Duration::days(7));

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_profile_fields() {
        let claims = Claims::new(TokenKind::Access, "user123", Duration::minutes(15))
            .with_email("alice@example.com")
            .with_full_name("Alice");

        assert_eq!(claims.email(), Some("alice@example.com"));
        assert_eq!(claims.full_name(), Some("Alice"));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let claims = Claims::new(TokenKind::Refresh, "user123", Duration::days(7));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["typ"], "refresh");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_profile_fields_round_trip_through_json() {
        let claims = Claims::new(TokenKind::Access, "user123", Duration::minutes(15))
            .with_full_name("Alice");
        let json = serde_json::to_value(&claims).unwrap();
        let decoded: Claims = serde_json::from_value(json).unwrap();

        assert_eq!(decoded.full_name(), Some("Alice"));
        assert_eq!(decoded.email(), None);
    }
}
