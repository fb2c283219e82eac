use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{AuthError, User};

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user, failing with `UsernameExists`/`EmailExists` on conflicts.
    async fn insert(&self, user: &User) -> Result<(), AuthError>;

    /// Finds a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Finds a user by (lowercase) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Finds every user whose id is in `ids`; unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, AuthError>;
}

/// User store kept in process memory, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<Uuid, User>>, AuthError> {
        self.users
            .lock()
            .map_err(|_| AuthError::Store("user map poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), AuthError> {
        let mut users = self.users()?;
        if users.values().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameExists);
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailExists);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users()?.values().find(|u| u.email == email).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, AuthError> {
        let users = self.users()?;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}
