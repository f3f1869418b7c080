//! Host extraction and normalization.
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110 §4.2.3)
//! - The port stays part of the key (`host[:port]`)
//! - HTTP/2 requests carry the host in the URI authority instead of `Host`

use axum::http::{header, Request};

/// Normalize a host for lookup: surrounding whitespace removed, lowercased.
pub fn normalize_host(host: &str) -> String {
    host.trim().to_lowercase()
}

/// Extract the normalized host of a request.
///
/// Prefers the `Host` header and falls back to the URI authority.
pub fn request_host<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .map(normalize_host)
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_host_header_is_lowercased() {
        let req = Request::builder()
            .header("Host", "EXAMPLE.com:8080")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&req).as_deref(), Some("example.com:8080"));
    }

    #[test]
    fn test_authority_fallback() {
        let req = Request::builder()
            .uri("https://Api.Example.com/v1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&req).as_deref(), Some("api.example.com"));
    }

    #[test]
    fn test_missing_host() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(request_host(&req), None);
    }
}
