//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.json
//!     → loader.rs (read & deserialize)
//!     → validation.rs (warnings, never fatal)
//!     → Config { file, port, RouteTable }
//!     → shared via Arc with the dispatch engine and the editor
//!
//! On every editor mutation:
//!     RouteTable write guard
//!     → mutation applied
//!     → loader.rs saves the table (guard still held)
//!     → guard released
//! ```
//!
//! # Design Decisions
//! - The file path is process-local metadata, never serialized
//! - A failed save leaves memory ahead of disk; the error is returned to the
//!   caller, never swallowed

pub mod loader;
pub mod schema;
pub mod validation;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::observability::metrics;
use crate::routing::{RouteError, RouteTable, RouteTableWriter};

pub use loader::{generate_template, ConfigError};
pub use schema::{ConfigFile, Route, DEFAULT_PORT};

/// Error for a mutation followed by a save.
#[derive(Debug, Error)]
pub enum EditError {
    /// Nothing was changed.
    #[error(transparent)]
    OutOfBounds(#[from] RouteError),

    /// The change is applied in memory but not written to disk.
    #[error("route table changed but could not be saved: {0}")]
    Persist(#[source] ConfigError),
}

/// Loaded configuration: port, route table and the file they persist to.
#[derive(Debug)]
pub struct Config {
    file: PathBuf,
    port: u16,
    routes: RouteTable,
    warnings: Vec<String>,
}

impl Config {
    /// Load and validate the route file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ConfigFile { port, routes } = loader::load_file(path)?;

        let warnings: Vec<String> = validation::validate_routes(&routes)
            .iter()
            .map(ToString::to_string)
            .collect();
        for warning in &warnings {
            tracing::warn!(path = %path.display(), "{}", warning);
        }

        let mut config = Self::new(path, port, routes);
        config.warnings = warnings;
        tracing::info!(
            path = %path.display(),
            port = config.port,
            routes = config.routes.len(),
            active = config.routes.active_count(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Build a configuration in memory; nothing is read or written.
    pub fn new(file: impl Into<PathBuf>, port: u16, routes: Vec<Route>) -> Self {
        let config = Self {
            file: file.into(),
            port,
            routes: RouteTable::new(routes),
            warnings: Vec::new(),
        };
        config.record_route_counts();
        config
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Validation findings from `load`, in table order.
    pub fn load_warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Write the current table to `file`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let routes = self.routes.snapshot();
        loader::save_file(&self.file, self.port, &routes)
    }

    /// Append an inactive route and save. Returns the new route's index.
    pub fn add_route(&self, source: &str, dest: &str) -> Result<usize, EditError> {
        self.apply(|routes| Ok(routes.add(source, dest)))
    }

    /// Remove the route at `index` and save.
    pub fn delete_route(&self, index: usize) -> Result<Route, EditError> {
        self.apply(|routes| routes.delete(index))
    }

    /// Flip the route at `index` and save. Returns the new active flag.
    pub fn toggle_route(&self, index: usize) -> Result<bool, EditError> {
        self.apply(|routes| routes.toggle_active(index))
    }

    /// Overwrite source and destination of the route at `index` and save.
    pub fn replace_route(&self, index: usize, source: &str, dest: &str) -> Result<(), EditError> {
        self.apply(|routes| routes.replace(index, source, dest))
    }

    /// Run `mutate` and the following save under one write lock.
    fn apply<T>(
        &self,
        mutate: impl FnOnce(&mut RouteTableWriter<'_>) -> Result<T, RouteError>,
    ) -> Result<T, EditError> {
        let mut routes = self.routes.write();
        let value = mutate(&mut routes)?;

        let saved = loader::save_file(&self.file, self.port, routes.routes());
        metrics::record_route_counts(
            routes.routes().len(),
            routes.routes().iter().filter(|r| r.active).count(),
        );
        drop(routes);

        match saved {
            Ok(()) => Ok(value),
            Err(e) => {
                tracing::error!(path = %self.file.display(), error = %e, "Failed to persist route table");
                Err(EditError::Persist(e))
            }
        }
    }

    fn record_route_counts(&self) {
        metrics::record_route_counts(self.routes.len(), self.routes.active_count());
    }
}
