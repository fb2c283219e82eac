use auth_services::{AuthError, UserSummary};
use chrono::{DateTime, Utc};
use geocoding::{Geometry, Point};
use media_services::{ImageRef, MediaError};
use serde::Serialize;
use uuid::Uuid;

use crate::validation::ValidationFailure;

/// Campground model representing the database schema
#[derive(Debug, Clone, PartialEq)]
pub struct Campground {
    /// Unique identifier for the campground
    pub id: Uuid,
    /// Title shown in listings
    pub title: String,
    /// Price per night, never negative
    pub price: f64,
    /// Free-text description
    pub description: String,
    /// Free-text location as entered by the owner
    pub location: String,
    /// Geocoded point of the location, when it could be resolved
    pub geometry: Option<Point>,
    /// Images in upload order
    pub images: Vec<ImageRef>,
    /// The user who created the campground; never changes
    pub author_id: Uuid,
    /// Reviews attached to the campground, oldest first
    pub review_ids: Vec<Uuid>,
    /// Time at which the campground was created
    pub created_at: DateTime<Utc>,
    /// Time at which the campground was last updated
    pub updated_at: DateTime<Utc>,
}

impl Campground {
    /// Whether `user_id` is the recorded owner.
    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.author_id == *user_id
    }
}

/// Review model representing the database schema
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Review text
    pub body: String,
    /// Rating between 1 and 5
    pub rating: i32,
    /// The user who wrote the review; never changes
    pub author_id: Uuid,
    /// Time at which the review was created
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Whether `user_id` is the recorded author.
    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.author_id == *user_id
    }
}

/// Image as shown in views
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    /// Public URL of the image
    pub url: String,
    /// Key on the asset host, submitted back in `deleteImages[]`
    pub filename: String,
    /// Width-limited variant URL
    pub thumbnail: String,
}

impl From<&ImageRef> for ImageView {
    fn from(image: &ImageRef) -> Self {
        Self {
            url: image.url.clone(),
            filename: image.filename.clone(),
            thumbnail: image.thumbnail(),
        }
    }
}

/// Campground as shown in the index and edit views
#[derive(Debug, Clone, Serialize)]
pub struct CampgroundView {
    /// Unique identifier for the campground
    pub id: Uuid,
    /// Title shown in listings
    pub title: String,
    /// Price per night
    pub price: f64,
    /// Free-text description
    pub description: String,
    /// Free-text location
    pub location: String,
    /// GeoJSON point, absent when the location was not resolved
    pub geometry: Option<Geometry>,
    /// Images in upload order
    pub images: Vec<ImageView>,
    /// Owner of the campground
    pub author_id: Uuid,
}

impl From<&Campground> for CampgroundView {
    fn from(campground: &Campground) -> Self {
        Self {
            id: campground.id,
            title: campground.title.clone(),
            price: campground.price,
            description: campground.description.clone(),
            location: campground.location.clone(),
            geometry: campground.geometry.map(|point| point.geometry()),
            images: campground.images.iter().map(ImageView::from).collect(),
            author_id: campground.author_id,
        }
    }
}

/// Review with its author resolved, as shown on the detail page
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetail {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Review text
    pub body: String,
    /// Rating between 1 and 5
    pub rating: i32,
    /// Author of the review, absent if the account no longer exists
    pub author: Option<UserSummary>,
}

/// Campground with owner and reviews resolved, as shown on the detail page
#[derive(Debug, Clone, Serialize)]
pub struct CampgroundDetail {
    /// The campground itself
    #[serde(flatten)]
    pub campground: CampgroundView,
    /// Owner of the campground, absent if the account no longer exists
    pub author: Option<UserSummary>,
    /// Reviews in the order they were added
    pub reviews: Vec<ReviewDetail>,
}

/// Error type for campground and review operations
#[derive(Debug, thiserror::Error)]
pub enum CampgroundError {
    /// The campground does not exist
    #[error("Cannot find that campground!")]
    NotFound,

    /// The review does not exist
    #[error("Cannot find that review!")]
    ReviewNotFound,

    /// The caller is not the owner of the resource
    #[error("You do not have permission to do that!")]
    Forbidden,

    /// The submitted payload is invalid
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// A database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The in-memory store could not be accessed
    #[error("Store error: {0}")]
    Store(String),

    /// Resolving authors failed
    #[error("User lookup failed: {0}")]
    Users(#[from] AuthError),

    /// The image host failed
    #[error("Image host error: {0}")]
    Media(#[from] MediaError),
}
