use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Enforces the same uniqueness rules and refresh-token compare-and-swap as
/// the `users` table. Backs the HTTP integration tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        for existing in users.values() {
            if existing.email == user.email {
                return Err(UserError::EmailAlreadyExists(user.email.to_string()));
            }
            if existing.full_name == user.full_name {
                return Err(UserError::FullNameAlreadyExists(user.full_name.to_string()));
            }
            if user.google_id.is_some() && existing.google_id == user.google_id {
                return Err(UserError::GoogleAccountConflict);
            }
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| &user.email == email))
    }

    async fn exists_by_full_name(&self, full_name: &FullName) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| &user.full_name == full_name))
    }

    async fn list_except(&self, id: &UserId) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| &user.id != id)
            .cloned()
            .collect();
        users.sort_by_key(|user| user.created_at);

        Ok(users)
    }

    async fn set_refresh_token(
        &self,
        id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        user.refresh_token = refresh_token;
        Ok(())
    }

    async fn replace_refresh_token(
        &self,
        id: &UserId,
        current: &str,
        replacement: &str,
    ) -> Result<bool, UserError> {
        let mut users = self.users.write().await;

        match users.get_mut(id) {
            Some(user) if user.refresh_token.as_deref() == Some(current) => {
                user.refresh_token = Some(replacement.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn link_google_id(&self, id: &UserId, google_id: &str) -> Result<(), UserError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|user| &user.id != id && user.google_id.as_deref() == Some(google_id))
        {
            return Err(UserError::GoogleAccountConflict);
        }

        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.google_id = Some(google_id.to_string());

        Ok(())
    }
}
