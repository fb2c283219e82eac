//! # Postgres
//!
//! This crate provides the PostgreSQL connection pool and schema bootstrap for the YelpCamp application.

/// Database client for the YelpCamp application.
pub mod database;
