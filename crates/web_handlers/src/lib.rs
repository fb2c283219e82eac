//! # Web Handlers for the YelpCamp Web Application
//!
//! This crate provides the request handlers, session context and middleware of YelpCamp.
//! Pages are rendered as JSON documents naming the view, the signed-in user,
//! the pending flash notices and the page data.

/// Shared application state
mod state;
pub use state::*;

/// Error type rendered as error pages and redirects
mod error;
pub use error::*;

/// Session-backed request context, flash notices and the signed-in user extractor
mod context;
pub use context::*;

/// Method override middleware for HTML forms
mod middleware;
pub use middleware::*;

/// Form bodies accepted by the handlers
mod forms;
pub use forms::*;

/// Registration, login and logout handlers
pub mod user_handlers;

/// Campground handlers
pub mod campground_handlers;

/// Review handlers
pub mod review_handlers;

/// Route table and fallback handlers
mod routes;
pub use routes::*;

#[cfg(test)]
mod tests;
