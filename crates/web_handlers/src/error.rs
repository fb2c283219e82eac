use actix_multipart::MultipartError;
use actix_session::{SessionGetError, SessionInsertError};
use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use auth_services::AuthError;
use campgrounds::{CampgroundError, ValidationFailure};

/// Message shown for every unexpected failure
pub const GENERIC_ERROR_MESSAGE: &str = "Oh No, Something Went Wrong!";

/// Error type for request handlers
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Submitted data failed validation; rendered as a 400 page
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// The request body could not be read
    #[error("{0}")]
    BadRequest(String),

    /// No route or record matched
    #[error("Page Not Found")]
    NotFound,

    /// Aborts the request with a redirect, typically after flashing a message
    #[error("Redirecting to {0}")]
    Redirect(String),

    /// Anything unexpected; the detail is logged, never shown
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::Validation(_) | WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::Redirect(_) => StatusCode::FOUND,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            WebError::Validation(failure) => HttpResponse::BadRequest().json(serde_json::json!({
                "view": "error",
                "error": "validation_error",
                "message": failure.to_string()
            })),
            WebError::BadRequest(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "view": "error",
                "error": "bad_request",
                "message": msg
            })),
            WebError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "view": "error",
                "error": "not_found",
                "message": "Page Not Found"
            })),
            WebError::Redirect(location) => HttpResponse::Found()
                .insert_header((header::LOCATION, location.as_str()))
                .finish(),
            WebError::Internal(detail) => {
                log::error!("❌ Request failed: {}", detail);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "view": "error",
                    "error": "internal_error",
                    "message": GENERIC_ERROR_MESSAGE
                }))
            }
        }
    }
}

impl From<CampgroundError> for WebError {
    fn from(error: CampgroundError) -> Self {
        match error {
            CampgroundError::Validation(failure) => WebError::Validation(failure),
            CampgroundError::NotFound | CampgroundError::ReviewNotFound => WebError::NotFound,
            other => WebError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for WebError {
    fn from(error: AuthError) -> Self {
        WebError::Internal(error.to_string())
    }
}

impl From<SessionGetError> for WebError {
    fn from(error: SessionGetError) -> Self {
        WebError::Internal(format!("failed to read session: {}", error))
    }
}

impl From<SessionInsertError> for WebError {
    fn from(error: SessionInsertError) -> Self {
        WebError::Internal(format!("failed to write session: {}", error))
    }
}

impl From<MultipartError> for WebError {
    fn from(error: MultipartError) -> Self {
        WebError::BadRequest(format!("Invalid form data: {}", error))
    }
}
