//! Route table lookup and mutation.
//!
//! # Responsibilities
//! - Store routes in operator order
//! - Look up the destination for a request host
//! - Apply editor mutations (add / delete / toggle, replace for a retried add)
//!
//! # Design Decisions
//! - A single `RwLock` guards the whole table; lookups share it, mutations
//!   take it exclusively
//! - Mutations go through [`RouteTableWriter`] so a caller can persist the
//!   result before the lock is released
//! - A poisoned lock is recovered: every mutation leaves the `Vec` valid

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

pub use crate::config::schema::Route;
use crate::routing::matcher::normalize_host;

/// Error for index-based table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route index {index} out of bounds (table has {len} routes)")]
    OutOfBounds { index: usize, len: usize },
}

/// Ordered, lock-guarded collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: RwLock<Vec<Route>>,
}

impl RouteTable {
    /// Create a table from loaded routes, keeping their order.
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes: RwLock::new(routes),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Route>> {
        self.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the exclusive lock for a mutation.
    pub fn write(&self) -> RouteTableWriter<'_> {
        RouteTableWriter {
            guard: self.routes.write().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Destination of the first active route whose source equals the
    /// lowercased host.
    pub fn lookup(&self, host: &str) -> Option<String> {
        let host = normalize_host(host);
        self.read()
            .iter()
            .find(|route| route.active && route.source == host)
            .map(|route| route.dest.clone())
    }

    /// Copy of the current routes, for rendering.
    pub fn snapshot(&self) -> Vec<Route> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of routes eligible for dispatch.
    pub fn active_count(&self) -> usize {
        self.read().iter().filter(|r| r.active).count()
    }

    /// Append an inactive route. Returns its index.
    pub fn add(&self, source: &str, dest: &str) -> usize {
        self.write().add(source, dest)
    }

    /// Remove the route at `index`.
    pub fn delete(&self, index: usize) -> Result<Route, RouteError> {
        self.write().delete(index)
    }

    /// Flip the active flag of the route at `index`. Returns the new value.
    pub fn toggle_active(&self, index: usize) -> Result<bool, RouteError> {
        self.write().toggle_active(index)
    }
}

/// Exclusive access to the table. The lock is released on drop.
pub struct RouteTableWriter<'a> {
    guard: RwLockWriteGuard<'a, Vec<Route>>,
}

impl RouteTableWriter<'_> {
    /// Routes as they are after the mutations applied so far.
    pub fn routes(&self) -> &[Route] {
        &self.guard
    }

    pub fn add(&mut self, source: &str, dest: &str) -> usize {
        self.guard.push(Route {
            source: normalize_host(source),
            dest: dest.trim().to_string(),
            active: false,
        });
        self.guard.len() - 1
    }

    pub fn delete(&mut self, index: usize) -> Result<Route, RouteError> {
        self.check(index)?;
        Ok(self.guard.remove(index))
    }

    /// Overwrite source and destination at `index`; the active flag is kept.
    pub fn replace(&mut self, index: usize, source: &str, dest: &str) -> Result<(), RouteError> {
        self.check(index)?;
        let route = &mut self.guard[index];
        route.source = normalize_host(source);
        route.dest = dest.trim().to_string();
        Ok(())
    }

    pub fn toggle_active(&mut self, index: usize) -> Result<bool, RouteError> {
        self.check(index)?;
        let route = &mut self.guard[index];
        route.active = !route.active;
        Ok(route.active)
    }

    fn check(&self, index: usize) -> Result<(), RouteError> {
        if index < self.guard.len() {
            Ok(())
        } else {
            Err(RouteError::OutOfBounds {
                index,
                len: self.guard.len(),
            })
        }
    }
}
