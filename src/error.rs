//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, info};

use crate::render::color::ColorFormatError;
use crate::storage::StorageError;

/// Errors surfaced by the render handlers.
#[derive(Debug)]
pub enum DuckgenError {
    /// The request was malformed; nothing was rendered.
    Validation(String),
    /// A built-in table or resource is corrupt.
    Format(String),
    /// Drawing or encoding failed.
    Render(String),
    /// The image could not be stored or published.
    Storage(String),
}

impl std::fmt::Display for DuckgenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::Format(message) => write!(f, "Corrupt built-in data: {message}"),
            Self::Render(message) => write!(f, "Rendering failed: {message}"),
            Self::Storage(message) => write!(f, "Storage failed: {message}"),
        }
    }
}

impl std::error::Error for DuckgenError {}

impl From<ColorFormatError> for DuckgenError {
    fn from(err: ColorFormatError) -> Self {
        DuckgenError::Format(err.to_string())
    }
}

impl From<image::ImageError> for DuckgenError {
    fn from(err: image::ImageError) -> Self {
        DuckgenError::Render(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DuckgenError {
    fn from(err: tokio::task::JoinError) -> Self {
        DuckgenError::Render(err.to_string())
    }
}

impl From<StorageError> for DuckgenError {
    fn from(err: StorageError) -> Self {
        DuckgenError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for DuckgenError {
    fn from(err: url::ParseError) -> Self {
        DuckgenError::Storage(format!("Failed to build public URL: {err}"))
    }
}

impl IntoResponse for DuckgenError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            DuckgenError::Validation(message) => {
                info!("Bad request received: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            DuckgenError::Format(message) => {
                error!("Corrupt built-in data: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate image".to_string(),
                )
            }
            DuckgenError::Render(message) => {
                error!("Render error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate image".to_string(),
                )
            }
            DuckgenError::Storage(message) => {
                error!("Storage error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store image".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
