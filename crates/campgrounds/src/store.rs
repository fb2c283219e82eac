use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{Campground, CampgroundError, Review};

/// Persistence for campgrounds.
#[async_trait]
pub trait CampgroundStore: Send + Sync {
    /// Every campground, oldest first.
    async fn list(&self) -> Result<Vec<Campground>, CampgroundError>;

    /// Finds a campground by id.
    async fn find(&self, id: &Uuid) -> Result<Option<Campground>, CampgroundError>;

    /// Inserts a new campground.
    async fn insert(&self, campground: &Campground) -> Result<(), CampgroundError>;

    /// Writes the editable fields (title, price, description, location,
    /// geometry, images) and the update time. Owner and review list are left
    /// untouched.
    async fn update(&self, campground: &Campground) -> Result<(), CampgroundError>;

    /// Deletes a campground, returning whether it existed.
    async fn delete(&self, id: &Uuid) -> Result<bool, CampgroundError>;

    /// Appends a review id to the campground's review list.
    async fn push_review(&self, id: &Uuid, review_id: &Uuid) -> Result<bool, CampgroundError>;

    /// Removes a review id from the campground's review list.
    async fn pull_review(&self, id: &Uuid, review_id: &Uuid) -> Result<bool, CampgroundError>;
}

/// Persistence for reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Finds a review by id.
    async fn find(&self, id: &Uuid) -> Result<Option<Review>, CampgroundError>;

    /// Finds every review whose id is in `ids`; unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Review>, CampgroundError>;

    /// Inserts a new review.
    async fn insert(&self, review: &Review) -> Result<(), CampgroundError>;

    /// Deletes a review, returning whether it existed.
    async fn delete(&self, id: &Uuid) -> Result<bool, CampgroundError>;

    /// Deletes every review whose id is in `ids`, returning how many were removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, CampgroundError>;
}

fn poisoned(what: &str) -> CampgroundError {
    CampgroundError::Store(format!("{} map poisoned", what))
}

/// Campground store kept in process memory, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryCampgroundStore {
    campgrounds: Arc<Mutex<HashMap<Uuid, Campground>>>,
}

impl MemoryCampgroundStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn campgrounds(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Campground>>, CampgroundError> {
        self.campgrounds.lock().map_err(|_| poisoned("campground"))
    }

    /// Number of stored campgrounds.
    pub fn len(&self) -> usize {
        self.campgrounds().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the store holds no campgrounds.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CampgroundStore for MemoryCampgroundStore {
    async fn list(&self) -> Result<Vec<Campground>, CampgroundError> {
        let mut campgrounds: Vec<Campground> = self.campgrounds()?.values().cloned().collect();
        campgrounds.sort_by_key(|c| c.created_at);
        Ok(campgrounds)
    }

    async fn find(&self, id: &Uuid) -> Result<Option<Campground>, CampgroundError> {
        Ok(self.campgrounds()?.get(id).cloned())
    }

    async fn insert(&self, campground: &Campground) -> Result<(), CampgroundError> {
        self.campgrounds()?
            .insert(campground.id, campground.clone());
        Ok(())
    }

    async fn update(&self, campground: &Campground) -> Result<(), CampgroundError> {
        let mut campgrounds = self.campgrounds()?;
        let stored = campgrounds
            .get_mut(&campground.id)
            .ok_or(CampgroundError::NotFound)?;

        stored.title = campground.title.clone();
        stored.price = campground.price;
        stored.description = campground.description.clone();
        stored.location = campground.location.clone();
        stored.geometry = campground.geometry;
        stored.images = campground.images.clone();
        stored.updated_at = campground.updated_at;
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, CampgroundError> {
        Ok(self.campgrounds()?.remove(id).is_some())
    }

    async fn push_review(&self, id: &Uuid, review_id: &Uuid) -> Result<bool, CampgroundError> {
        match self.campgrounds()?.get_mut(id) {
            Some(campground) => {
                campground.review_ids.push(*review_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_review(&self, id: &Uuid, review_id: &Uuid) -> Result<bool, CampgroundError> {
        match self.campgrounds()?.get_mut(id) {
            Some(campground) => {
                campground.review_ids.retain(|r| r != review_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Review store kept in process memory, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryReviewStore {
    reviews: Arc<Mutex<HashMap<Uuid, Review>>>,
}

impl MemoryReviewStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn reviews(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Review>>, CampgroundError> {
        self.reviews.lock().map_err(|_| poisoned("review"))
    }

    /// Number of stored reviews.
    pub fn len(&self) -> usize {
        self.reviews().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the store holds no reviews.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn find(&self, id: &Uuid) -> Result<Option<Review>, CampgroundError> {
        Ok(self.reviews()?.get(id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Review>, CampgroundError> {
        let reviews = self.reviews()?;
        Ok(ids.iter().filter_map(|id| reviews.get(id).cloned()).collect())
    }

    async fn insert(&self, review: &Review) -> Result<(), CampgroundError> {
        self.reviews()?.insert(review.id, review.clone());
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, CampgroundError> {
        Ok(self.reviews()?.remove(id).is_some())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, CampgroundError> {
        let mut reviews = self.reviews()?;
        Ok(ids.iter().filter(|id| reviews.remove(id).is_some()).count() as u64)
    }
}
