//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Serve plain HTTP or TLS on the bound listener
//! - Dispatch requests through the route table
//! - Forward requests to the destination and stream the response back

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::http::forward::{self, UpstreamClient};
use crate::http::headers::{prepare_request_headers, strip_hop_by_hop};
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::DispatchError;
use crate::net::tls::Transport;
use crate::observability::metrics;
use crate::routing::{parse_destination, request_host};

/// In-flight requests get this long to finish after shutdown is signalled.
const GRACEFUL_SHUTDOWN: Duration = Duration::from_secs(10);

/// Error type for running the server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: UpstreamClient,
    pub tls: bool,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    transport: Transport,
}

impl HttpServer {
    /// Create a new HTTP server dispatching through `config`'s route table.
    pub fn new(config: Arc<Config>, transport: Transport) -> Self {
        let state = AppState {
            config,
            client: forward::build_client(),
            tls: transport.is_tls(),
        };

        Self {
            router: Self::build_router(state),
            transport,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The router, for serving on a custom transport.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        match self.transport {
            Transport::Plain => {
                tracing::info!(address = %addr, "HTTP server starting");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                    })
                    .await?;
            }
            Transport::Rustls { config, cert_path } => {
                let handle = axum_server::Handle::new();

                let waiter = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    waiter.graceful_shutdown(Some(GRACEFUL_SHUTDOWN));
                });

                tracing::info!(address = %addr, cert = %cert_path.display(), "HTTPS server starting");
                axum_server::from_tcp_rustls(listener.into_std()?, config)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().to_string();

    let response = match dispatch(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                DispatchError::HostNotFound { .. } => {
                    tracing::warn!(request_id = %request_id, error = %e, "No route matched")
                }
                _ => tracing::error!(request_id = %request_id, error = %e, "Dispatch failed"),
            }
            e.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}

/// Look up the route for a request and forward it.
async fn dispatch(state: &AppState, mut request: Request<Body>) -> Result<Response, DispatchError> {
    let host = request_host(&request).unwrap_or_default();

    // The read lock is held inside lookup only
    let dest = state
        .config
        .routes()
        .lookup(&host)
        .ok_or_else(|| DispatchError::HostNotFound { host: host.clone() })?;

    let target = match parse_destination(&dest) {
        Ok(target) => target,
        Err(source) => return Err(DispatchError::InvalidDestination { dest, source }),
    };
    let uri = match forward::upstream_uri(&target, request.uri()) {
        Ok(uri) => uri,
        Err(source) => return Err(DispatchError::UpstreamUri { dest, source }),
    };

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    prepare_request_headers(
        request.headers_mut(),
        &forward::authority(&target),
        client_ip,
        state.tls,
    );

    tracing::debug!(
        host = %host,
        method = %request.method(),
        upstream = %uri,
        "Proxying request"
    );

    *request.uri_mut() = uri;
    *request.version_mut() = Version::HTTP_11;

    let response = state
        .client
        .request(request)
        .await
        .map_err(|source| DispatchError::Upstream { dest, source })?;

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}
