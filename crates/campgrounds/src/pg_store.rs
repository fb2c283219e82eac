use async_trait::async_trait;
use geocoding::Point;
use media_services::ImageRef;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::store::{CampgroundStore, ReviewStore};
use crate::types::{Campground, CampgroundError, Review};

/// Campground store backed by the `campgrounds` table.
#[derive(Debug, Clone)]
pub struct PgCampgroundStore {
    pool: PgPool,
}

impl PgCampgroundStore {
    /// Creates a new instance of `PgCampgroundStore` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn campground_from_row(row: &PgRow) -> Campground {
    let longitude: Option<f64> = row.get("longitude");
    let latitude: Option<f64> = row.get("latitude");
    let images: Json<Vec<ImageRef>> = row.get("images");

    Campground {
        id: row.get("id"),
        title: row.get("title"),
        price: row.get("price"),
        description: row.get("description"),
        location: row.get("location"),
        geometry: longitude
            .zip(latitude)
            .map(|(lng, lat)| Point::new(lng, lat)),
        images: images.0,
        author_id: row.get("author_id"),
        review_ids: row.get("review_ids"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const CAMPGROUND_COLUMNS: &str = "id, title, price, description, location, longitude, latitude, \
     images, author_id, review_ids, created_at, updated_at";

#[async_trait]
impl CampgroundStore for PgCampgroundStore {
    async fn list(&self) -> Result<Vec<Campground>, CampgroundError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM campgrounds ORDER BY created_at",
            CAMPGROUND_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    async fn find(&self, id: &Uuid) -> Result<Option<Campground>, CampgroundError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM campgrounds WHERE id = $1",
            CAMPGROUND_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(campground_from_row))
    }

    async fn insert(&self, campground: &Campground) -> Result<(), CampgroundError> {
        sqlx::query(
            r#"
            INSERT INTO campgrounds (
                id, title, price, description, location, longitude, latitude,
                images, author_id, review_ids, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(campground.id)
        .bind(&campground.title)
        .bind(campground.price)
        .bind(&campground.description)
        .bind(&campground.location)
        .bind(campground.geometry.map(|p| p.longitude))
        .bind(campground.geometry.map(|p| p.latitude))
        .bind(Json(&campground.images))
        .bind(campground.author_id)
        .bind(&campground.review_ids)
        .bind(campground.created_at)
        .bind(campground.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, campground: &Campground) -> Result<(), CampgroundError> {
        let result = sqlx::query(
            r#"
            UPDATE campgrounds
            SET title = $2, price = $3, description = $4, location = $5,
                longitude = $6, latitude = $7, images = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(campground.id)
        .bind(&campground.title)
        .bind(campground.price)
        .bind(&campground.description)
        .bind(&campground.location)
        .bind(campground.geometry.map(|p| p.longitude))
        .bind(campground.geometry.map(|p| p.latitude))
        .bind(Json(&campground.images))
        .bind(campground.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CampgroundError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, CampgroundError> {
        let result = sqlx::query("DELETE FROM campgrounds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn push_review(&self, id: &Uuid, review_id: &Uuid) -> Result<bool, CampgroundError> {
        let result = sqlx::query(
            "UPDATE campgrounds SET review_ids = array_append(review_ids, $2) WHERE id = $1",
        )
        .bind(id)
        .bind(review_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_review(&self, id: &Uuid, review_id: &Uuid) -> Result<bool, CampgroundError> {
        let result = sqlx::query(
            "UPDATE campgrounds SET review_ids = array_remove(review_ids, $2) WHERE id = $1",
        )
        .bind(id)
        .bind(review_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Review store backed by the `reviews` table.
#[derive(Debug, Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    /// Creates a new instance of `PgReviewStore` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn review_from_row(row: &PgRow) -> Review {
    Review {
        id: row.get("id"),
        body: row.get("body"),
        rating: row.get("rating"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn find(&self, id: &Uuid) -> Result<Option<Review>, CampgroundError> {
        let row = sqlx::query(
            r#"
            SELECT id, body, rating, author_id, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Review>, CampgroundError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // array_position keeps the order of `ids`
        let rows = sqlx::query(
            r#"
            SELECT id, body, rating, author_id, created_at
            FROM reviews
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    async fn insert(&self, review: &Review) -> Result<(), CampgroundError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, body, rating, author_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(review.id)
        .bind(&review.body)
        .bind(review.rating)
        .bind(review.author_id)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, CampgroundError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, CampgroundError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM reviews WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
