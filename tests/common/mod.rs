//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    Router,
};
use portal::config::{Config, Route};
use portal::lifecycle::Shutdown;
use portal::net::Transport;
use portal::HttpServer;
use tokio::net::TcpListener;

/// Start a backend that answers every request with
/// `host=<Host> path=<path> query=<query> forwarded-host=<X-Forwarded-Host>`.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(|headers: HeaderMap, request: Request<Body>| async move {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string()
        };
        format!(
            "host={} path={} query={} forwarded-host={}",
            header("host"),
            request.uri().path(),
            request.uri().query().unwrap_or(""),
            header("x-forwarded-host"),
        )
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A port on loopback with nothing listening.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn route(source: &str, dest: &str, active: bool) -> Route {
    Route {
        source: source.into(),
        dest: dest.into(),
        active,
    }
}

pub fn temp_config_path() -> PathBuf {
    std::env::temp_dir().join(format!("portal-it-{}.json", uuid::Uuid::new_v4()))
}

/// Serve `config` on an ephemeral port. The returned `Shutdown` stops it.
pub async fn start_proxy(config: Arc<Config>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Transport::Plain);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    (addr, shutdown)
}
