use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenKind;

/// Signing secret and lifetime for one kind of token.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl TokenPolicy {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl,
        }
    }
}

/// Access and refresh tokens issued together at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies session tokens.
///
/// Access tokens are short-lived and carry the user's profile; refresh tokens
/// are long-lived and carry only the subject. Each kind is signed with its
/// own secret and stamped with its kind, so neither can stand in for the other.
pub struct TokenIssuer {
    access: JwtHandler,
    access_ttl: Duration,
    refresh: JwtHandler,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(access: TokenPolicy, refresh: TokenPolicy) -> Self {
        Self {
            access: JwtHandler::new(&access.secret),
            access_ttl: access.ttl,
            refresh: JwtHandler::new(&refresh.secret),
            refresh_ttl: refresh.ttl,
        }
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign a short-lived access token for a user.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_access(
        &self,
        subject: impl ToString,
        email: &str,
        full_name: &str,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(TokenKind::Access, subject, self.access_ttl)
            .with_email(email)
            .with_full_name(full_name);

        self.access.encode(&claims)
    }

    /// Sign a long-lived refresh token for a user.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_refresh(&self, subject: impl ToString) -> Result<String, JwtError> {
        let claims = Claims::new(TokenKind::Refresh, subject, self.refresh_ttl);

        self.refresh.encode(&claims)
    }

    /// Sign both tokens for a user.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_pair(
        &self,
        subject: impl ToString,
        email: &str,
        full_name: &str,
    ) -> Result<TokenPair, JwtError> {
        let subject = subject.to_string();

        Ok(TokenPair {
            access_token: self.issue_access(&subject, email, full_name)?,
            refresh_token: self.issue_refresh(&subject)?,
        })
    }

    /// Verify an access token's signature, expiry and kind.
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        Self::verify(&self.access, token, TokenKind::Access)
    }

    /// Verify a refresh token's signature, expiry and kind.
    ///
    /// This does not check revocation; the caller compares the token with
    /// the stored one.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        Self::verify(&self.refresh, token, TokenKind::Refresh)
    }

    fn verify(handler: &JwtHandler, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims: Claims = handler.decode(token)?;

        if claims.typ != expected {
            return Err(JwtError::WrongTokenKind {
                expected,
                actual: claims.typ,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &[u8] = b"access_secret_at_least_32_bytes_long!";
    const REFRESH_SECRET: &[u8] = b"refresh_secret_at_least_32_bytes_long";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            TokenPolicy::new(ACCESS_SECRET, Duration::minutes(15)),
            TokenPolicy::new(REFRESH_SECRET, Duration::days(7)),
        )
    }

    #[test]
    fn test_access_token_round_trip() {
        let issuer = issuer();

        let token = issuer
            .issue_access("user123", "alice@example.com", "Alice")
            .expect("Failed to issue access token");
        let claims = issuer.verify_access(&token).expect("Failed to verify");

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.email(), Some("alice@example.com"));
        assert_eq!(claims.full_name(), Some("Alice"));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let issuer = issuer();

        let token = issuer.issue_refresh("user123").unwrap();
        let claims = issuer.verify_refresh(&token).unwrap();

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert!(claims.email().is_none());
    }

    #[test]
    fn test_pair_tokens_are_distinct_per_issue() {
        let issuer = issuer();

        let first = issuer.issue_pair("user123", "a@x.com", "Alice").unwrap();
        let second = issuer.issue_pair("user123", "a@x.com", "Alice").unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let issuer = issuer();

        let refresh = issuer.issue_refresh("user123").unwrap();
        assert!(issuer.verify_access(&refresh).is_err());

        let access = issuer.issue_access("user123", "a@x.com", "Alice").unwrap();
        assert!(issuer.verify_refresh(&access).is_err());
    }

    #[test]
    fn test_kind_checked_when_secrets_are_shared() {
        let issuer = TokenIssuer::new(
            TokenPolicy::new(ACCESS_SECRET, Duration::minutes(15)),
            TokenPolicy::new(ACCESS_SECRET, Duration::days(7)),
        );

        let refresh = issuer.issue_refresh("user123").unwrap();
        let result = issuer.verify_access(&refresh);

        assert_eq!(
            result,
            Err(JwtError::WrongTokenKind {
                expected: TokenKind::Access,
                actual: TokenKind::Refresh,
            })
        );
    }

    #[test]
    fn test_expired_refresh_token() {
        let issuer = TokenIssuer::new(
            TokenPolicy::new(ACCESS_SECRET, Duration::minutes(15)),
            TokenPolicy::new(REFRESH_SECRET, Duration::hours(-2)),
        );

        let token = issuer.issue_refresh("user123").unwrap();
        assert_eq!(issuer.verify_refresh(&token), Err(JwtError::TokenExpired));
    }
}
