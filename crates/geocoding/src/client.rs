use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::types::{GeocodeError, Geometry, Point};

const MAPTILER_BASE_URL: &str = "https://api.maptiler.com/geocoding";

/// Resolves a free-text location into a point.
///
/// `Ok(None)` means the service answered but knows no such place.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Forward-geocodes `location`, returning the best match.
    async fn forward(&self, location: &str) -> Result<Option<Point>, GeocodeError>;
}

/// Client for the MapTiler forward geocoding API
pub struct MapTilerGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Subset of the MapTiler GeoJSON feature collection we read
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodingFeature {
    // Kept loose: non-point features carry nested coordinate arrays.
    geometry: Option<serde_json::Value>,
}

impl MapTilerGeocoder {
    /// Create a new MapTiler client using the given API key
    pub fn new(api_key: String) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, MAPTILER_BASE_URL.to_string())
    }

    /// Create a client against a different endpoint (self-hosted or test server)
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GeocodeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn query_url(&self, location: &str) -> String {
        format!(
            "{}/{}.json",
            self.base_url,
            urlencoding::encode(location.trim())
        )
    }
}

#[async_trait]
impl Geocoder for MapTilerGeocoder {
    async fn forward(&self, location: &str) -> Result<Option<Point>, GeocodeError> {
        let url = self.query_url(location);
        log::debug!("🗺️ Geocoding location '{}'", location);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            log::warn!("Geocoding request for '{}' failed with {}", location, status);
            return Err(GeocodeError::Status(status));
        }

        let body: GeocodingResponse = response.json().await?;
        Ok(first_point(body))
    }
}

fn first_point(response: GeocodingResponse) -> Option<Point> {
    response
        .features
        .into_iter()
        .filter_map(|feature| feature.geometry)
        .filter_map(|value| serde_json::from_value::<Geometry>(value).ok())
        .find_map(|geometry| geometry.to_point())
}

/// Geocoder that answers every lookup with the same canned point.
///
/// Used when no geocoding service is configured (`StaticGeocoder::disabled()`)
/// and as a deterministic stub in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    point: Option<Point>,
}

impl StaticGeocoder {
    /// Always resolves to `point`.
    pub fn new(point: Point) -> Self {
        Self { point: Some(point) }
    }

    /// Never resolves anything; campgrounds are stored without coordinates.
    pub fn disabled() -> Self {
        Self { point: None }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn forward(&self, _location: &str) -> Result<Option<Point>, GeocodeError> {
        Ok(self.point)
    }
}
