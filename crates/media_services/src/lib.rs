//! # Media Services
//!
//! This crate stores campground images on an external asset host.
//! It includes the `ImageStore` port, an S3-backed host and an in-memory host.

/// Service definitions for storing and deleting image assets.
pub mod service;
/// Types and structures used by the image asset host.
pub mod types;

pub use service::{ImageStore, MemoryImageStore, S3ImageStore};
pub use types::{ImageRef, ImageUpload, MediaError};
