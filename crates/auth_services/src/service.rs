use std::{collections::HashMap, sync::Arc};

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::store::UserStore;
use crate::types::{AuthError, LoginRequest, RegisterRequest, User, UserSummary, validation_message};

/// A service for handling user authentication operations such as registering users,
/// verifying credentials and resolving user identities.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    cost: u32,
}

impl AuthService {
    /// Creates a new instance of `AuthService` backed by the given user store.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            cost: DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt cost factor (lower values are only suitable for tests).
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Registers a new user with a salted password hash.
    ///
    /// Email and username are trimmed (and the email lowercased) before they
    /// are validated.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let normalized = RegisterRequest {
            email: request.email.trim().to_lowercase(),
            username: request.username.trim().to_string(),
            password: request.password.clone(),
        };
        normalized
            .validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let RegisterRequest {
            email,
            username,
            password,
        } = normalized;

        // Check if username or email already exists
        if self.store.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameExists);
        }
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        // Hash the password
        let password_hash = hash(&password, self.cost)?;

        let user = User {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            created_at: Utc::now(),
        };
        self.store.insert(&user).await?;

        log::info!("👤 Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Verifies the user's password against the stored hash.
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<User, AuthError> {
        if request.validate().is_err() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .find_by_username(request.username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = verify(&request.password, &user.password_hash)?;

        if !is_valid {
            log::info!("🔒 Failed login attempt for {}", user.username);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Resolves the public identity of each id; unknown ids are left out of the map.
    pub async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, AuthError> {
        let mut unique: Vec<Uuid> = ids.to_vec();
        unique.sort();
        unique.dedup();

        let users = self.store.find_many(&unique).await?;
        Ok(users
            .iter()
            .map(|user| (user.id, UserSummary::from(user)))
            .collect())
    }
}
