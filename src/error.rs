//! Error types and handling for the climate API

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for the climate API
#[derive(Error, Debug)]
pub enum ClimateApiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Database unavailable or a query failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Stored data does not have the expected shape
    #[error("Data error: {message}")]
    Data { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ClimateApiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new data error
    pub fn data<S: Into<String>>(message: S) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// HTTP status a handler answers with when this error escapes it
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClimateApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ClimateApiError::Config { .. }
            | ClimateApiError::Storage { .. }
            | ClimateApiError::Data { .. }
            | ClimateApiError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClimateApiError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ClimateApiError::Storage { .. } => {
                "The observation database is unavailable.".to_string()
            }
            ClimateApiError::Data { message } => {
                format!("The observation dataset is inconsistent: {message}")
            }
            ClimateApiError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            ClimateApiError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<sqlx::Error> for ClimateApiError {
    fn from(err: sqlx::Error) -> Self {
        ClimateApiError::storage(err.to_string())
    }
}

impl IntoResponse for ClimateApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(status = status.as_u16(), "Request failed: {}", self);
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
