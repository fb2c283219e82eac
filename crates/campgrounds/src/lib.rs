//! # Campgrounds
//!
//! This crate provides the campground and review model of YelpCamp.
//! It handles payload validation, persistence (PostgreSQL and in-memory) and the
//! service operations, including the cascade that removes reviews and images
//! together with their campground.

/// Types for campgrounds, reviews and their views
mod types;
pub use types::*;

/// Validation of submitted campground and review payloads
mod validation;
pub use validation::*;

/// Store ports and their in-memory implementations
mod store;
pub use store::*;

/// PostgreSQL implementations of the store ports
mod pg_store;
pub use pg_store::*;

/// Service orchestrating stores, geocoding and the image host
mod service;
pub use service::*;
