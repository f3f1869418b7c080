//! Mapping of dispatch failures to HTTP responses.
//!
//! # Design Decisions
//! - Every failure is local to its request; no shared state changes
//! - Bodies are fixed strings, details only go to the log

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routing::DestinationError;

/// Per-request dispatch failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no active route for host '{host}'")]
    HostNotFound { host: String },

    #[error("destination '{dest}' is not a valid URL: {source}")]
    InvalidDestination {
        dest: String,
        #[source]
        source: DestinationError,
    },

    #[error("cannot build upstream URI for '{dest}': {source}")]
    UpstreamUri {
        dest: String,
        #[source]
        source: InvalidUri,
    },

    #[error("upstream request to '{dest}' failed: {source}")]
    Upstream {
        dest: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::HostNotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::InvalidDestination { .. } | DispatchError::UpstreamUri { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DispatchError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> &'static str {
        match self {
            DispatchError::HostNotFound { .. } => "Host not found",
            DispatchError::InvalidDestination { .. } | DispatchError::UpstreamUri { .. } => {
                "Invalid URL format"
            }
            DispatchError::Upstream { .. } => "Bad Gateway",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}
