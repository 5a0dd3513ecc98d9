//! In-process credential store.
//!
//! Used by tests and local tooling. Inserts check and write under one write
//! lock, which gives the same all-or-nothing uniqueness as the database
//! constraints.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::repository::UserRepository;
use crate::auth::{AuthError, AuthResult, NewUser, User, UserId, UserStatus};

/// `UserRepository` backed by a `HashMap`
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: NewUser) -> AuthResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        if users.values().any(|u| u.name == user.name) {
            return Err(AuthError::NameTaken);
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            status: UserStatus::Available,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_available_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).filter(|u| u.is_available()).cloned())
    }

    async fn deactivate_user(&self, user_id: UserId) -> AuthResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.status = UserStatus::Cancelled;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn health_check(&self) -> AuthResult<()> {
        Ok(())
    }
}
