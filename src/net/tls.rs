//! TLS configuration and certificate loading.
//!
//! Certificate and key are both absent (plain HTTP) or both present and on
//! disk (HTTPS). Anything else is a startup error, and so is PEM material
//! rustls cannot load: it is parsed before serving starts.

use std::fmt;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

/// Error type for TLS setup.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("both --cert and --key are required for HTTPS (got only {given})")]
    Incomplete { given: &'static str },

    #[error("{kind} file not found: {}", path.display())]
    MissingFile { kind: &'static str, path: PathBuf },

    #[error("failed to load certificate/key: {0}")]
    Load(#[from] std::io::Error),
}

/// How the listener serves traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    Plain,
    Rustls { cert_path: PathBuf, key_path: PathBuf },
}

impl TlsMode {
    /// Decide the mode from the `--cert` / `--key` flags.
    ///
    /// Empty paths count as absent.
    pub fn from_paths(cert: Option<&Path>, key: Option<&Path>) -> Result<Self, TlsError> {
        let cert = cert.filter(|p| !p.as_os_str().is_empty());
        let key = key.filter(|p| !p.as_os_str().is_empty());

        match (cert, key) {
            (None, None) => Ok(TlsMode::Plain),
            (Some(_), None) => Err(TlsError::Incomplete { given: "--cert" }),
            (None, Some(_)) => Err(TlsError::Incomplete { given: "--key" }),
            (Some(cert), Some(key)) => {
                ensure_exists("certificate", cert)?;
                ensure_exists("private key", key)?;
                Ok(TlsMode::Rustls {
                    cert_path: cert.to_path_buf(),
                    key_path: key.to_path_buf(),
                })
            }
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, TlsMode::Rustls { .. })
    }

    /// Parse the certificate and key, if any.
    pub async fn load(self) -> Result<Transport, TlsError> {
        match self {
            TlsMode::Plain => Ok(Transport::Plain),
            TlsMode::Rustls {
                cert_path,
                key_path,
            } => {
                let config = load_tls_config(&cert_path, &key_path).await?;
                Ok(Transport::Rustls { config, cert_path })
            }
        }
    }
}

/// Transport with its TLS material loaded, ready to serve.
#[derive(Clone)]
pub enum Transport {
    Plain,
    Rustls {
        config: RustlsConfig,
        cert_path: PathBuf,
    },
}

impl Transport {
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Rustls { .. })
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Plain => f.write_str("Plain"),
            Transport::Rustls { cert_path, .. } => f
                .debug_struct("Rustls")
                .field("cert_path", cert_path)
                .finish_non_exhaustive(),
        }
    }
}

fn ensure_exists(kind: &'static str, path: &Path) -> Result<(), TlsError> {
    if path.exists() {
        Ok(())
    } else {
        Err(TlsError::MissingFile {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    ensure_exists("certificate", cert_path)?;
    ensure_exists("private key", key_path)?;

    Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?)
}
