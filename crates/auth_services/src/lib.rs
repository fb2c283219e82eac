//! # Auth Services
//!
//! This crate provides user registration and credential verification for the application.
//! It includes the user model, user stores (PostgreSQL and in-memory) and the bcrypt-backed service.

/// PostgreSQL implementation of the user store.
pub mod pg_store;
/// Service definitions for user registration and authentication operations.
pub mod service;
/// The user store port and its in-memory implementation.
pub mod store;
/// Types and structures used in authentication services.
pub mod types;

pub use pg_store::PgUserStore;
pub use service::AuthService;
pub use store::{MemoryUserStore, UserStore};
pub use types::*;
