use serde::{Deserialize, Serialize};

/// A geographic point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
}

impl Point {
    /// Creates a point from a longitude/latitude pair.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// GeoJSON representation used by map clients.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            kind: "Point".to_string(),
            coordinates: [self.longitude, self.latitude],
        }
    }
}

/// GeoJSON geometry object (`{"type": "Point", "coordinates": [lng, lat]}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Geometry type, always "Point" for campgrounds
    #[serde(rename = "type")]
    pub kind: String,
    /// Longitude followed by latitude
    pub coordinates: [f64; 2],
}

impl Geometry {
    /// Converts a GeoJSON point back into a `Point`, ignoring other geometry types.
    pub fn to_point(&self) -> Option<Point> {
        if self.kind != "Point" {
            return None;
        }
        Some(Point::new(self.coordinates[0], self.coordinates[1]))
    }
}

/// Error type for geocoding lookups
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The HTTP request to the geocoding service failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoding service answered with a non-success status
    #[error("Geocoding service returned status {0}")]
    Status(u16),

    /// The HTTP client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}
