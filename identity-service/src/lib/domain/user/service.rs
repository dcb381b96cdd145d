use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::OAuthProfile;
use crate::domain::user::models::RefreshedSession;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user and session operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    token_issuer: Arc<TokenIssuer>,
    password_hasher: PasswordHasher,
    rotate_refresh_tokens: bool,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `token_issuer` - Access/refresh token issuer
    /// * `rotate_refresh_tokens` - Replace the refresh token on every refresh
    pub fn new(
        repository: Arc<UR>,
        token_issuer: Arc<TokenIssuer>,
        rotate_refresh_tokens: bool,
    ) -> Self {
        Self {
            repository,
            token_issuer,
            password_hasher: PasswordHasher::new(),
            rotate_refresh_tokens,
        }
    }

    /// Issue a token pair and make its refresh token the only valid one.
    async fn start_session(&self, mut user: User) -> Result<Session, UserError> {
        let tokens = self.token_issuer.issue_pair(
            user.id,
            user.email.as_str(),
            user.full_name.as_str(),
        )?;

        self.repository
            .set_refresh_token(&user.id, Some(tokens.refresh_token.clone()))
            .await?;
        user.refresh_token = Some(tokens.refresh_token.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Session started");

        Ok(Session { user, tokens })
    }

    /// Pick a free full name for a new OAuth user.
    ///
    /// Falls back to the email's local part when the provider sends no name,
    /// and appends the tail of the provider subject when the name is taken.
    async fn available_full_name(
        &self,
        profile: &OAuthProfile,
        email: &EmailAddress,
    ) -> Result<FullName, UserError> {
        let local_part = email.as_str().split('@').next().unwrap_or_default();
        let preferred = FullName::new(profile.name.clone())
            .or_else(|_| FullName::new(local_part.to_string()))?;

        if !self.repository.exists_by_full_name(&preferred).await? {
            return Ok(preferred);
        }

        let tail_start = profile.subject.len().saturating_sub(6);
        let suffix = profile.subject.get(tail_start..).unwrap_or(&profile.subject);
        Ok(FullName::new(format!("{} {}", preferred, suffix))?)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if self.repository.exists_by_email(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }
        if self.repository.exists_by_full_name(&command.full_name).await? {
            return Err(UserError::FullNameAlreadyExists(
                command.full_name.to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            full_name: command.full_name,
            email: command.email,
            password_hash: Some(password_hash),
            google_id: None,
            refresh_token: None,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            email = %created_user.email,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, UserError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(UserError::EmailRequired);
        }

        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::UnknownEmail(email.to_string()))?;

        let password_matches = match &user.password_hash {
            Some(hash) => self.password_hasher.verify(password, hash)?,
            None => false,
        };
        if !password_matches {
            tracing::warn!(user_id = %user.id, "Login rejected: incorrect password");
            return Err(UserError::IncorrectPassword);
        }

        self.start_session(user).await
    }

    async fn login_with_google(&self, profile: OAuthProfile) -> Result<Session, UserError> {
        if let Some(user) = self.repository.find_by_google_id(&profile.subject).await? {
            return self.start_session(user).await;
        }

        // Linking or creating by email requires the provider to vouch for it.
        if !profile.email_verified {
            tracing::warn!(email = %profile.email, "Google login rejected: unverified email");
            return Err(UserError::UnverifiedOAuthEmail);
        }

        if let Some(mut user) = self.repository.find_by_email(profile.email.trim()).await? {
            if user.google_id.is_some() {
                return Err(UserError::GoogleAccountConflict);
            }
            self.repository
                .link_google_id(&user.id, &profile.subject)
                .await?;
            user.google_id = Some(profile.subject.clone());
            tracing::info!(user_id = %user.id, "Google account linked");

            return self.start_session(user).await;
        }

        let email = EmailAddress::new(profile.email.clone())?;
        let full_name = self.available_full_name(&profile, &email).await?;

        let user = User {
            id: UserId::new(),
            full_name,
            email,
            password_hash: None,
            google_id: Some(profile.subject),
            refresh_token: None,
            created_at: Utc::now(),
        };
        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            email = %created_user.email,
            "User registered through Google"
        );

        self.start_session(created_user).await
    }

    async fn logout(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.set_refresh_token(id, None).await?;
        tracing::info!(user_id = %id, "Session revoked");

        Ok(())
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<RefreshedSession, UserError> {
        let presented = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(UserError::RefreshTokenMissing)?;

        let claims = self
            .token_issuer
            .verify_refresh(presented)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh token rejected");
                UserError::RefreshTokenInvalid
            })?;

        let user_id = UserId::from_string(&claims.sub).map_err(|_| UserError::RefreshTokenRevoked)?;

        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .filter(|user| user.refresh_token.as_deref() == Some(presented))
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Refresh token no longer stored");
                UserError::RefreshTokenRevoked
            })?;

        let access_token = self.token_issuer.issue_access(
            user.id,
            user.email.as_str(),
            user.full_name.as_str(),
        )?;

        let refresh_token = if self.rotate_refresh_tokens {
            let replacement = self.token_issuer.issue_refresh(user.id)?;
            let swapped = self
                .repository
                .replace_refresh_token(&user.id, presented, &replacement)
                .await?;
            if !swapped {
                tracing::warn!(user_id = %user.id, "Refresh token changed during rotation");
                return Err(UserError::RefreshTokenRevoked);
            }
            Some(replacement)
        } else {
            None
        };

        tracing::debug!(
            user_id = %user.id,
            rotated = refresh_token.is_some(),
            "Access token refreshed"
        );

        Ok(RefreshedSession {
            access_token,
            refresh_token,
        })
    }

    async fn list_other_users(&self, id: &UserId) -> Result<Vec<User>, UserError> {
        self.repository.list_except(id).await
    }
}
