use std::fmt;
use std::str::FromStr;

use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::FullNameError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// `refresh_token` holds the single refresh token currently accepted for
/// this user; replacing or clearing it revokes the previous one.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub full_name: FullName,
    pub email: EmailAddress,
    /// Absent for accounts created through Google sign-in.
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name, unique across users.
///
/// Surrounding whitespace is trimmed; the result must be non-empty and at
/// most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullName(String);

impl FullName {
    const MAX_LENGTH: usize = 100;

    /// Create a new valid full name.
    ///
    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(full_name: String) -> Result<Self, FullNameError> {
        let trimmed = full_name.trim();
        let length = trimmed.chars().count();

        if length == 0 {
            Err(FullNameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(FullNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub full_name: FullName,
    pub email: EmailAddress,
    /// Plain text password, hashed by the service
    pub password: String,
}

impl RegisterUserCommand {
    pub fn new(full_name: FullName, email: EmailAddress, password: String) -> Self {
        Self {
            full_name,
            email,
            password,
        }
    }
}

/// Identity resolved by an external OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    /// Provider's stable subject identifier
    pub subject: String,
    pub email: String,
    /// Whether the provider has verified that the subject owns `email`
    pub email_verified: bool,
    pub name: String,
}

/// Result of a successful login: the user and a freshly issued token pair.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

/// Result of exchanging a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedSession {
    pub access_token: String,
    /// Replacement refresh token when rotation is enabled
    pub refresh_token: Option<String>,
}
