//! Destination URL parsing.

use thiserror::Error;
use url::Url;

/// Why a route destination cannot be forwarded to.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme '{0}' (expected http or https)")]
    Scheme(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Parse a route destination into an absolute `http`/`https` base URL.
pub fn parse_destination(dest: &str) -> Result<Url, DestinationError> {
    let url = Url::parse(dest.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(DestinationError::Scheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(DestinationError::MissingHost);
    }

    Ok(url)
}
