use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tracing::error;

/// Request-level failures of the `/favicons` endpoint.
///
/// Each variant maps to exactly one status code and one fixed client-facing
/// message. Details carried by a variant are logged, never returned.
#[derive(Debug)]
pub enum FaviconError {
    MissingParameters,
    InvalidUrl(String),
    NoFavicons,
}

impl FaviconError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FaviconError::MissingParameters => StatusCode::BAD_REQUEST,
            FaviconError::NoFavicons => StatusCode::NOT_FOUND,
            FaviconError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_message(&self) -> &'static str {
        match self {
            FaviconError::MissingParameters => "URL and size parameters are required",
            FaviconError::NoFavicons => "No favicons found",
            FaviconError::InvalidUrl(_) => "Failed to fetch or process favicons",
        }
    }
}

impl fmt::Display for FaviconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaviconError::MissingParameters => write!(f, "Missing url or size parameter"),
            FaviconError::InvalidUrl(msg) => write!(f, "Invalid target URL: {msg}"),
            FaviconError::NoFavicons => write!(f, "No favicon source returned an image"),
        }
    }
}

impl Error for FaviconError {}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

impl IntoResponse for FaviconError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Error fetching or processing favicons: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}
