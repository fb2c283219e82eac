use serde::{Deserialize, Serialize};

/// Reference to an image stored on the asset host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Public URL of the asset
    pub url: String,
    /// Key of the asset on the host, used to delete it
    pub filename: String,
}

impl ImageRef {
    /// URL of a 200px wide variant when the host supports on-the-fly resizing
    /// (Cloudinary-style `/upload/` URLs); otherwise the original URL.
    pub fn thumbnail(&self) -> String {
        if self.url.contains("/upload/") {
            self.url.replacen("/upload/", "/upload/w_200/", 1)
        } else {
            self.url.clone()
        }
    }
}

/// An uploaded file waiting to be stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Raw file content
    pub data: Vec<u8>,
    /// File name supplied by the browser, if any
    pub file_name: Option<String>,
    /// MIME type supplied by the browser, if any
    pub content_type: Option<String>,
}

/// Error type for the image asset host
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The upload had no content
    #[error("Uploaded file is empty")]
    EmptyUpload,

    /// Storing an asset failed
    #[error("Failed to store image: {0}")]
    Upload(String),

    /// Deleting an asset failed
    #[error("Failed to delete image {filename}: {message}")]
    Delete {
        /// Key of the asset that could not be deleted
        filename: String,
        /// Error reported by the host
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_for_resizing_host() {
        let image = ImageRef {
            url: "https://res.cloudinary.com/demo/image/upload/v1/YelpCamp/abc.jpg".to_string(),
            filename: "YelpCamp/abc".to_string(),
        };
        assert_eq!(
            image.thumbnail(),
            "https://res.cloudinary.com/demo/image/upload/w_200/v1/YelpCamp/abc.jpg"
        );
    }

    #[test]
    fn test_thumbnail_falls_back_to_original() {
        let image = ImageRef {
            url: "https://bucket.s3.amazonaws.com/YelpCamp/abc.jpg".to_string(),
            filename: "YelpCamp/abc.jpg".to_string(),
        };
        assert_eq!(image.thumbnail(), image.url);
    }
}
