//! Configuration loading from and saving to disk.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

use crate::config::schema::{ConfigFile, ConfigFileRef, Route};

/// Error type for configuration loading and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("malformed config file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    fn io(path: &Path, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read and parse a route file.
pub fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::io(path, e),
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize with 4-space indentation, matching files already in use.
pub fn to_pretty_json(port: u16, routes: &[Route]) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    ConfigFileRef { port, routes }.serialize(&mut ser)?;
    Ok(out)
}

/// Overwrite `path` with the given port and routes.
///
/// Not crash-atomic: an interrupted write can leave a truncated file.
pub fn save_file(path: &Path, port: u16, routes: &[Route]) -> Result<(), ConfigError> {
    let data = to_pretty_json(port, routes).map_err(|e| ConfigError::io(path, e.into()))?;
    fs::write(path, data).map_err(|e| ConfigError::io(path, e))?;

    tracing::debug!(path = %path.display(), routes = routes.len(), "Configuration saved");
    Ok(())
}

/// Write the starter configuration to `path`.
///
/// An existing file is only replaced when `force` is set.
pub fn generate_template(path: &Path, force: bool) -> Result<(), ConfigError> {
    if !force && path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    let template = ConfigFile::template();
    save_file(path, template.port, &template.routes)?;

    tracing::info!(path = %path.display(), "Template configuration written");
    Ok(())
}
