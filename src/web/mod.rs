//! HTTP surface of the registry.
//!
//! `POST /update` stores a status, `GET /` returns every domain and
//! `GET /{domain}` returns a single history. Read responses are YAML.

pub mod app;
pub mod handlers;
pub mod models;
pub mod validation;

use crate::core::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use validation::InputError;

pub use app::{AppState, build_router};

/// Body returned for unknown domains.
pub const NOT_FOUND_MESSAGE: &str = "Does Not Exist";
/// Body returned when a request body cannot be read or decoded.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON";

#[derive(Debug)]
pub enum WebError {
    Input(String),
    NotFound,
    Store(StoreError),
}

impl From<InputError> for WebError {
    fn from(err: InputError) -> Self {
        WebError::Input(err.message().to_string())
    }
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        WebError::Store(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebError::Input(msg) => (StatusCode::BAD_REQUEST, msg),
            WebError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
            WebError::Store(err) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
