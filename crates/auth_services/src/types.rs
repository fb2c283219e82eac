use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request structure for user registration
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address of the user
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Username used to log in
    #[validate(length(min = 1, max = 64, message = "No username was given"))]
    pub username: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "No password was given"))]
    pub password: String,
}

/// Request structure for user login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username of the user
    #[validate(length(min = 1, message = "Missing credentials"))]
    pub username: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "Missing credentials"))]
    pub password: String,
}

/// User model representing the database schema
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Email address of the user, stored lowercase
    pub email: String,
    /// Unique username of the user
    pub username: String,
    /// Salted bcrypt hash of the user's password
    pub password_hash: String,
    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

/// Public identity of a user, safe to keep in the session and show in views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Username of the user
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The username is already taken
    #[error("A user with the given username is already registered")]
    UsernameExists,

    /// The email address already exists in the system
    #[error("A user with the given email is already registered")]
    EmailExists,

    /// The provided credentials are invalid
    #[error("Password or username is incorrect")]
    InvalidCredentials,

    /// A database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// An error occurred while validating input data
    #[error("{0}")]
    Validation(String),

    /// The in-memory store could not be accessed
    #[error("Store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Whether the error is caused by the submitted data and should be shown to the user.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AuthError::UsernameExists
                | AuthError::EmailExists
                | AuthError::InvalidCredentials
                | AuthError::Validation(_)
        )
    }
}

/// Joins the messages of a failed `validate()` call, in a stable field order.
pub fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages: Vec<String> = Vec::new();
    for (field, field_errors) in fields {
        for error in field_errors {
            let message = match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            };
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
    }
    messages.join(",")
}
