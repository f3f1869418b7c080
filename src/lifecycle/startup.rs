//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the route file
//! - Decide plain HTTP vs TLS from the flags and parse the PEM files
//! - Bind the listener on the configured port
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and happens before serving
//! - Listener binds last (traffic only when ready)

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{Config, ConfigError};
use crate::net::{self, ListenerError, TlsError, TlsMode, Transport};

/// Process flags consumed at startup.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

/// Error that aborts the process before serving begins.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Everything needed to start serving.
#[derive(Debug)]
pub struct Startup {
    pub config: Arc<Config>,
    pub transport: Transport,
    pub listener: TcpListener,
}

/// Load config, load TLS material and bind, in that order.
pub async fn prepare(options: &StartupOptions) -> Result<Startup, StartupError> {
    let config = Arc::new(Config::load(&options.config_path)?);

    let transport = TlsMode::from_paths(options.cert_path.as_deref(), options.key_path.as_deref())?
        .load()
        .await?;
    tracing::info!(tls = transport.is_tls(), "Transport selected");

    let listener = net::bind(net::listen_addr(config.port())).await?;

    Ok(Startup {
        config,
        transport,
        listener,
    })
}
