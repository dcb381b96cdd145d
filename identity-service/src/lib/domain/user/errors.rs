use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for FullName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FullNameError {
    #[error("Full name must not be empty")]
    Empty,

    #[error("Full name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all user and session operations.
///
/// Display strings are the messages returned to API clients.
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid full name: {0}")]
    InvalidFullName(#[from] FullNameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Registration
    #[error("All Fields are Required..")]
    MissingFields,

    #[error("User with this email already exists..")]
    EmailAlreadyExists(String),

    #[error("User with this fullName already exists..")]
    FullNameAlreadyExists(String),

    // Password login
    #[error("Email is Required")]
    EmailRequired,

    #[error("User does not exist with this email")]
    UnknownEmail(String),

    #[error("Password is incorrect")]
    IncorrectPassword,

    // Refresh
    #[error("No refresh token provided")]
    RefreshTokenMissing,

    #[error("Invalid or expired refresh token")]
    RefreshTokenInvalid,

    #[error("Refresh token revoked")]
    RefreshTokenRevoked,

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Google account already linked to another user")]
    GoogleAccountConflict,

    #[error("Google account email is not verified")]
    UnverifiedOAuthEmail,

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<auth::PasswordError> for UserError {
    fn from(err: auth::PasswordError) -> Self {
        UserError::Password(err.to_string())
    }
}

impl From<auth::JwtError> for UserError {
    fn from(err: auth::JwtError) -> Self {
        UserError::Token(err.to_string())
    }
}

/// Error for OAuth provider interactions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Fetching the provider profile failed: {0}")]
    ProfileFailed(String),
}
