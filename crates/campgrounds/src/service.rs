use std::sync::Arc;

use auth_services::AuthService;
use chrono::Utc;
use geocoding::{Geocoder, Point};
use media_services::{ImageRef, ImageStore, ImageUpload};
use uuid::Uuid;

use crate::store::{CampgroundStore, ReviewStore};
use crate::types::{
    Campground, CampgroundDetail, CampgroundError, CampgroundView, Review, ReviewDetail,
};
use crate::validation::{CampgroundInput, ReviewInput};

/// Campground and review operations.
///
/// Ownership is checked through [`CampgroundService::authorize`] and
/// [`CampgroundService::authorize_review`]; the mutating operations take the
/// record those checks returned.
#[derive(Clone)]
pub struct CampgroundService {
    campgrounds: Arc<dyn CampgroundStore>,
    reviews: Arc<dyn ReviewStore>,
    users: AuthService,
    geocoder: Arc<dyn Geocoder>,
    images: Arc<dyn ImageStore>,
}

impl CampgroundService {
    /// Creates a new instance of `CampgroundService` over the given stores and collaborators.
    pub fn new(
        campgrounds: Arc<dyn CampgroundStore>,
        reviews: Arc<dyn ReviewStore>,
        users: AuthService,
        geocoder: Arc<dyn Geocoder>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            campgrounds,
            reviews,
            users,
            geocoder,
            images,
        }
    }

    /// Every campground, oldest first.
    pub async fn list(&self) -> Result<Vec<Campground>, CampgroundError> {
        self.campgrounds.list().await
    }

    /// Finds a campground without resolving its owner or reviews.
    pub async fn find(&self, id: &Uuid) -> Result<Option<Campground>, CampgroundError> {
        self.campgrounds.find(id).await
    }

    /// Finds a campground with its owner and reviews (and their authors) resolved.
    pub async fn show(&self, id: &Uuid) -> Result<Option<CampgroundDetail>, CampgroundError> {
        let Some(campground) = self.campgrounds.find(id).await? else {
            return Ok(None);
        };

        let reviews = self.reviews.find_many(&campground.review_ids).await?;

        let mut author_ids: Vec<Uuid> = reviews.iter().map(|r| r.author_id).collect();
        author_ids.push(campground.author_id);
        let authors = self.users.summaries(&author_ids).await?;

        let reviews = reviews
            .into_iter()
            .map(|review| ReviewDetail {
                author: authors.get(&review.author_id).cloned(),
                id: review.id,
                body: review.body,
                rating: review.rating,
            })
            .collect();

        Ok(Some(CampgroundDetail {
            campground: CampgroundView::from(&campground),
            author: authors.get(&campground.author_id).cloned(),
            reviews,
        }))
    }

    /// Loads the campground and checks that `user_id` owns it.
    pub async fn authorize(
        &self,
        id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Campground, CampgroundError> {
        let campground = self
            .campgrounds
            .find(id)
            .await?
            .ok_or(CampgroundError::NotFound)?;

        if !campground.is_owned_by(user_id) {
            log::warn!("🚫 User {} tried to modify campground {}", user_id, id);
            return Err(CampgroundError::Forbidden);
        }

        Ok(campground)
    }

    /// Loads the review and checks that `user_id` wrote it.
    pub async fn authorize_review(
        &self,
        review_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Review, CampgroundError> {
        let review = self
            .reviews
            .find(review_id)
            .await?
            .ok_or(CampgroundError::ReviewNotFound)?;

        if !review.is_owned_by(user_id) {
            log::warn!("🚫 User {} tried to delete review {}", user_id, review_id);
            return Err(CampgroundError::Forbidden);
        }

        Ok(review)
    }

    /// Creates a campground owned by `author_id`, geocoding its location and
    /// storing the uploaded images.
    pub async fn create(
        &self,
        author_id: Uuid,
        input: CampgroundInput,
        uploads: Vec<ImageUpload>,
    ) -> Result<Campground, CampgroundError> {
        let geometry = self.locate(&input.location).await;
        let images = self.upload_all(uploads).await?;
        let now = Utc::now();

        let campground = Campground {
            id: Uuid::new_v4(),
            title: input.title,
            price: input.price,
            description: input.description,
            location: input.location,
            geometry,
            images,
            author_id,
            review_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.campgrounds.insert(&campground).await {
            self.discard(&campground.images).await;
            return Err(e);
        }

        log::info!(
            "🏕️ Campground {} created by {} with {} image(s)",
            campground.id,
            author_id,
            campground.images.len()
        );
        Ok(campground)
    }

    /// Applies edited fields to an authorized campground, appends new images and
    /// removes the images named in `delete_images`.
    ///
    /// The location is geocoded again only when it changed. Names in
    /// `delete_images` that do not belong to this campground are ignored.
    pub async fn update(
        &self,
        mut campground: Campground,
        input: CampgroundInput,
        uploads: Vec<ImageUpload>,
        delete_images: &[String],
    ) -> Result<Campground, CampgroundError> {
        if campground.location != input.location {
            campground.geometry = self.locate(&input.location).await;
        }

        campground.title = input.title;
        campground.price = input.price;
        campground.description = input.description;
        campground.location = input.location;

        let (removed, mut kept): (Vec<ImageRef>, Vec<ImageRef>) = campground
            .images
            .into_iter()
            .partition(|image| delete_images.contains(&image.filename));

        let added = self.upload_all(uploads).await?;
        kept.extend(added.iter().cloned());
        campground.images = kept;
        campground.updated_at = Utc::now();

        if let Err(e) = self.campgrounds.update(&campground).await {
            self.discard(&added).await;
            return Err(e);
        }

        // Assets go only once the record no longer references them.
        self.discard(&removed).await;

        log::info!(
            "🏕️ Campground {} updated ({} image(s) removed)",
            campground.id,
            removed.len()
        );
        Ok(campground)
    }

    /// Deletes an authorized campground together with its reviews and images.
    ///
    /// Reviews go first, then the record; image assets are removed last and a
    /// failure there is only logged.
    pub async fn delete(&self, campground: Campground) -> Result<(), CampgroundError> {
        let removed_reviews = self.reviews.delete_many(&campground.review_ids).await?;

        if !self.campgrounds.delete(&campground.id).await? {
            return Err(CampgroundError::NotFound);
        }

        self.discard(&campground.images).await;

        log::info!(
            "🗑️ Campground {} deleted with {} review(s)",
            campground.id,
            removed_reviews
        );
        Ok(())
    }

    /// Adds a review by `author_id` to the campground.
    pub async fn add_review(
        &self,
        campground_id: &Uuid,
        author_id: Uuid,
        input: ReviewInput,
    ) -> Result<Review, CampgroundError> {
        if self.campgrounds.find(campground_id).await?.is_none() {
            return Err(CampgroundError::NotFound);
        }

        let review = Review {
            id: Uuid::new_v4(),
            body: input.body,
            rating: input.rating,
            author_id,
            created_at: Utc::now(),
        };
        self.reviews.insert(&review).await?;

        if !self.campgrounds.push_review(campground_id, &review.id).await? {
            // The campground vanished in between; do not leave an orphan behind.
            self.reviews.delete(&review.id).await?;
            return Err(CampgroundError::NotFound);
        }

        log::info!("⭐ Review {} added to campground {}", review.id, campground_id);
        Ok(review)
    }

    /// Detaches an authorized review from the campground and deletes it.
    ///
    /// Fails with `ReviewNotFound` when the review belongs to another campground.
    pub async fn delete_review(
        &self,
        campground_id: &Uuid,
        review: Review,
    ) -> Result<(), CampgroundError> {
        let campground = self
            .campgrounds
            .find(campground_id)
            .await?
            .ok_or(CampgroundError::NotFound)?;
        if !campground.review_ids.contains(&review.id) {
            return Err(CampgroundError::ReviewNotFound);
        }

        self.campgrounds.pull_review(campground_id, &review.id).await?;
        self.reviews.delete(&review.id).await?;

        log::info!(
            "🗑️ Review {} removed from campground {}",
            review.id,
            campground_id
        );
        Ok(())
    }

    /// Resolves a location, leaving the point unset when the lookup fails.
    async fn locate(&self, location: &str) -> Option<Point> {
        match self.geocoder.forward(location).await {
            Ok(point) => {
                if point.is_none() {
                    log::warn!("🗺️ No coordinates found for location '{}'", location);
                }
                point
            }
            Err(e) => {
                log::error!("❌ Geocoding '{}' failed: {}", location, e);
                None
            }
        }
    }

    async fn upload_all(&self, uploads: Vec<ImageUpload>) -> Result<Vec<ImageRef>, CampgroundError> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.images.upload(upload).await {
                Ok(image) => stored.push(image),
                Err(e) => {
                    log::error!("❌ Image upload failed: {}", e);
                    self.discard(&stored).await;
                    return Err(e.into());
                }
            }
        }
        Ok(stored)
    }

    /// Removes assets from the image host, logging failures.
    async fn discard(&self, images: &[ImageRef]) {
        for image in images {
            if let Err(e) = self.images.destroy(&image.filename).await {
                log::error!("❌ Failed to remove image {}: {}", image.filename, e);
            }
        }
    }
}
