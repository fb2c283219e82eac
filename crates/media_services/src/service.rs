use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client as S3Client, primitives::ByteStream};
use uuid::Uuid;

use crate::types::{ImageRef, ImageUpload, MediaError};

/// Folder every campground image is stored under
const IMAGE_FOLDER: &str = "YelpCamp";

/// External host for campground images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the upload and returns where it can be fetched from.
    async fn upload(&self, upload: ImageUpload) -> Result<ImageRef, MediaError>;

    /// Deletes the asset stored under `filename`.
    async fn destroy(&self, filename: &str) -> Result<(), MediaError>;
}

/// Builds a unique storage key, keeping a sane extension from the browser's file name.
fn storage_key(file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}/{}.{}", IMAGE_FOLDER, Uuid::new_v4().simple(), ext),
        None => format!("{}/{}", IMAGE_FOLDER, Uuid::new_v4().simple()),
    }
}

/// Image host backed by an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ImageStore {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl S3ImageStore {
    /// Creates a store for `bucket`, loading AWS credentials from the environment.
    ///
    /// `public_url` is the base URL assets are served from (bucket website or CDN).
    pub async fn new(bucket: String, public_url: String) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Self {
            client: S3Client::new(&config),
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, upload: ImageUpload) -> Result<ImageRef, MediaError> {
        if upload.data.is_empty() {
            return Err(MediaError::EmptyUpload);
        }

        let key = storage_key(upload.file_name.as_deref());
        log::info!("🖼️ Uploading image to s3://{}/{}", self.bucket, key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(upload.data));
        if let Some(content_type) = upload.content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|e| {
            log::error!("❌ S3 upload error: {:#?}", e);
            MediaError::Upload(format!("{}", e))
        })?;

        Ok(ImageRef {
            url: format!("{}/{}", self.public_url, key),
            filename: key,
        })
    }

    async fn destroy(&self, filename: &str) -> Result<(), MediaError> {
        log::info!("🗑️ Deleting image s3://{}/{}", self.bucket, filename);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(filename)
            .send()
            .await
            .map_err(|e| MediaError::Delete {
                filename: filename.to_string(),
                message: format!("{}", e),
            })?;

        Ok(())
    }
}

/// Image host that keeps assets in process memory.
///
/// Used for local runs without an S3 bucket and in tests.
#[derive(Debug, Clone)]
pub struct MemoryImageStore {
    base_url: String,
    assets: Arc<Mutex<HashMap<String, usize>>>,
}

impl MemoryImageStore {
    /// Creates an empty store whose URLs start with `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            assets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether an asset is currently stored under `filename`.
    pub fn contains(&self, filename: &str) -> bool {
        self.assets
            .lock()
            .map(|assets| assets.contains_key(filename))
            .unwrap_or(false)
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.assets.lock().map(|assets| assets.len()).unwrap_or(0)
    }

    /// Whether the store holds no assets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, upload: ImageUpload) -> Result<ImageRef, MediaError> {
        if upload.data.is_empty() {
            return Err(MediaError::EmptyUpload);
        }

        let key = storage_key(upload.file_name.as_deref());
        let mut assets = self
            .assets
            .lock()
            .map_err(|_| MediaError::Upload("asset map poisoned".to_string()))?;
        assets.insert(key.clone(), upload.data.len());

        Ok(ImageRef {
            url: format!("{}/{}", self.base_url, key),
            filename: key,
        })
    }

    async fn destroy(&self, filename: &str) -> Result<(), MediaError> {
        let mut assets = self.assets.lock().map_err(|_| MediaError::Delete {
            filename: filename.to_string(),
            message: "asset map poisoned".to_string(),
        })?;
        // Deleting an unknown asset is not an error, matching S3 semantics.
        assets.remove(filename);
        Ok(())
    }
}
