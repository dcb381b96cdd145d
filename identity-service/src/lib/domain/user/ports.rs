use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::OAuthProfile;
use crate::domain::user::models::RefreshedSession;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::OAuthError;
use crate::user::errors::UserError;

/// Port for user and session operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// Email uniqueness is checked before full-name uniqueness; the first
    /// failing check wins.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `FullNameAlreadyExists` - Full name is already taken
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Verify email and password and open a session.
    ///
    /// The new refresh token replaces any previously stored one.
    ///
    /// # Errors
    /// * `EmailRequired` - Email is blank
    /// * `UnknownEmail` - No user with this email
    /// * `IncorrectPassword` - Password does not match
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, email: &str, password: &str) -> Result<Session, UserError>;

    /// Resolve or create the user behind an OAuth identity and open a session.
    ///
    /// # Errors
    /// * `GoogleAccountConflict` - Email belongs to a user linked to another Google account
    /// * `InvalidEmail` - Provider returned an unusable email
    /// * `DatabaseError` - Database operation failed
    async fn login_with_google(&self, profile: OAuthProfile) -> Result<Session, UserError>;

    /// Revoke the user's refresh token.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn logout(&self, id: &UserId) -> Result<(), UserError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    /// * `RefreshTokenMissing` - No token presented
    /// * `RefreshTokenInvalid` - Bad signature, expired, or not a refresh token
    /// * `RefreshTokenRevoked` - Token is no longer the stored one
    /// * `DatabaseError` - Database operation failed
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<RefreshedSession, UserError>;

    /// List every user except `id`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_other_users(&self, id: &UserId) -> Result<Vec<User>, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `FullNameAlreadyExists` - Full name is already taken
    /// * `GoogleAccountConflict` - Google id is already linked
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by exact email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve user linked to a Google account.
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError>;

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;

    async fn exists_by_full_name(&self, full_name: &FullName) -> Result<bool, UserError>;

    /// Retrieve all users except one, oldest first.
    async fn list_except(&self, id: &UserId) -> Result<Vec<User>, UserError>;

    /// Overwrite (or clear, with `None`) the stored refresh token.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_refresh_token(
        &self,
        id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<(), UserError>;

    /// Replace the stored refresh token only if it still equals `current`.
    ///
    /// # Returns
    /// `true` if the swap happened, `false` if the stored token had changed
    async fn replace_refresh_token(
        &self,
        id: &UserId,
        current: &str,
        replacement: &str,
    ) -> Result<bool, UserError>;

    /// Attach a Google account to an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `GoogleAccountConflict` - Google id is already linked elsewhere
    async fn link_google_id(&self, id: &UserId, google_id: &str) -> Result<(), UserError>;
}

/// External OAuth identity provider (authorization code flow).
#[async_trait]
pub trait OAuthProvider: Send + Sync + 'static {
    /// URL of the provider's consent page, carrying `state` back to the callback.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the user's profile.
    ///
    /// # Errors
    /// * `ExchangeFailed` - Token endpoint rejected the code
    /// * `ProfileFailed` - Profile could not be fetched or parsed
    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, OAuthError>;
}
