//! Forwarding helpers: upstream client and URI rewriting.
//!
//! # Design Decisions
//! - One shared client; no per-destination handles
//! - Destination path prefix and request path join with a single slash
//! - Destination query comes first, request query is appended with `&`

use axum::body::Body;
use axum::http::uri::{InvalidUri, Uri};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

/// Client used to reach http and https destinations.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the upstream client.
pub fn build_client() -> UpstreamClient {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();

    Client::builder(TokioExecutor::new()).build(connector)
}

/// `host[:port]` of a destination, as sent in the `Host` header.
pub fn authority(target: &Url) -> String {
    let host = target.host_str().unwrap_or_default();
    match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Absolute URI for the backend request.
pub fn upstream_uri(target: &Url, request: &Uri) -> Result<Uri, InvalidUri> {
    let path = join_path(target.path(), request.path());

    let query = match (target.query().filter(|q| !q.is_empty()), request.query()) {
        (Some(a), Some(b)) if !b.is_empty() => Some(format!("{}&{}", a, b)),
        (Some(a), _) => Some(a.to_string()),
        (None, b) => b.filter(|q| !q.is_empty()).map(str::to_string),
    };

    let mut uri = format!("{}://{}{}", target.scheme(), authority(target), path);
    if let Some(query) = query {
        uri.push('?');
        uri.push_str(&query);
    }
    uri.parse()
}

fn join_path(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
