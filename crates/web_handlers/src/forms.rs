use actix_multipart::Multipart;
use auth_services::{LoginRequest, RegisterRequest};
use campgrounds::{CampgroundPayload, ReviewPayload};
use futures_util::TryStreamExt;
use media_services::ImageUpload;
use serde::Deserialize;

use crate::error::WebError;

/// Largest accepted image part
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Largest accepted text part
pub const MAX_TEXT_BYTES: usize = 64 * 1024;

/// Campground create/edit form (`multipart/form-data`)
#[derive(Debug, Default)]
pub struct CampgroundForm {
    /// `campground[...]` fields
    pub campground: CampgroundPayload,
    /// Non-empty files submitted under `image`
    pub images: Vec<ImageUpload>,
    /// Filenames submitted under `deleteImages[]`
    pub delete_images: Vec<String>,
}

impl CampgroundForm {
    /// Reads every part of the multipart body. Unknown parts are drained and ignored.
    pub async fn read(mut payload: Multipart) -> Result<Self, WebError> {
        let mut form = CampgroundForm::default();

        while let Some(mut field) = payload.try_next().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());

            let limit = if name == "image" {
                MAX_IMAGE_BYTES
            } else {
                MAX_TEXT_BYTES
            };
            let mut data = Vec::new();
            while let Some(chunk) = field.try_next().await? {
                if data.len() + chunk.len() > limit {
                    return Err(WebError::BadRequest(format!("Field '{}' is too large", name)));
                }
                data.extend_from_slice(&chunk);
            }

            match name.as_str() {
                "image" => {
                    // Browsers send an empty part when no file was picked
                    if !data.is_empty() {
                        form.images.push(ImageUpload {
                            data,
                            file_name,
                            content_type,
                        });
                    }
                }
                "campground[title]" => form.campground.title = Some(text(&name, data)?),
                "campground[price]" => form.campground.price = Some(text(&name, data)?),
                "campground[location]" => form.campground.location = Some(text(&name, data)?),
                "campground[description]" => {
                    form.campground.description = Some(text(&name, data)?)
                }
                "deleteImages[]" | "deleteImages" => form.delete_images.push(text(&name, data)?),
                other => log::debug!("Ignoring unexpected form field '{}'", other),
            }
        }

        Ok(form)
    }
}

fn text(name: &str, data: Vec<u8>) -> Result<String, WebError> {
    String::from_utf8(data)
        .map_err(|_| WebError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))
}

/// Review form (`application/x-www-form-urlencoded`)
#[derive(Debug, Default, Deserialize)]
pub struct ReviewForm {
    /// `review[rating]`
    #[serde(rename = "review[rating]")]
    pub rating: Option<String>,
    /// `review[body]`
    #[serde(rename = "review[body]")]
    pub body: Option<String>,
}

impl From<ReviewForm> for ReviewPayload {
    fn from(form: ReviewForm) -> Self {
        ReviewPayload {
            rating: form.rating,
            body: form.body,
        }
    }
}

/// Registration form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    /// Email address
    pub email: String,
    /// Desired username
    pub username: String,
    /// Plain-text password
    pub password: String,
}

impl From<RegisterForm> for RegisterRequest {
    fn from(form: RegisterForm) -> Self {
        RegisterRequest {
            email: form.email,
            username: form.username,
            password: form.password,
        }
    }
}

/// Login form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Username
    pub username: String,
    /// Plain-text password
    pub password: String,
}

impl From<LoginForm> for LoginRequest {
    fn from(form: LoginForm) -> Self {
        LoginRequest {
            username: form.username,
            password: form.password,
        }
    }
}
