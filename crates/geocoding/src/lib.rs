//! # Geocoding
//!
//! This crate resolves free-text campground locations (e.g. "Austin, TX") into
//! geographic points using the MapTiler geocoding API.

/// Point and GeoJSON geometry types, and the geocoding error type.
mod types;
pub use types::*;

/// The `Geocoder` port and its implementations.
mod client;
pub use client::*;
