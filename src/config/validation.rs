//! Configuration validation.
//!
//! # Responsibilities
//! - Flag routes that can never match (empty or non-lowercase sources)
//! - Flag destinations that will answer 500 at dispatch time
//! - Flag active routes shadowed by an earlier route with the same source
//!
//! # Design Decisions
//! - Returns all findings, not just the first
//! - Findings are warnings: a route file that parses is always accepted,
//!   bad routes surface per request instead of at startup

use std::collections::HashMap;

use crate::config::schema::Route;
use crate::routing::destination::{parse_destination, DestinationError};
use crate::routing::matcher::normalize_host;

/// A non-fatal problem found in the route table.
#[derive(Debug, thiserror::Error)]
pub enum ValidationWarning {
    #[error("route {index}: empty source")]
    EmptySource { index: usize },

    #[error("route {index}: source '{host}' is not normalized and will never match (expected '{expected}')")]
    UnnormalizedSource {
        index: usize,
        host: String,
        expected: String,
    },

    #[error("route {index}: destination '{dest}' is unusable: {reason}")]
    InvalidDestination {
        index: usize,
        dest: String,
        reason: DestinationError,
    },

    #[error("route {index}: active source '{host}' is shadowed by route {first}")]
    Shadowed {
        index: usize,
        first: usize,
        host: String,
    },
}

/// Check every route. Pure: no logging, no I/O.
pub fn validate_routes(routes: &[Route]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut first_active: HashMap<&str, usize> = HashMap::new();

    for (index, route) in routes.iter().enumerate() {
        let expected = normalize_host(&route.source);
        if expected.is_empty() {
            warnings.push(ValidationWarning::EmptySource { index });
        } else if expected != route.source {
            warnings.push(ValidationWarning::UnnormalizedSource {
                index,
                host: route.source.clone(),
                expected,
            });
        }

        if let Err(reason) = parse_destination(&route.dest) {
            warnings.push(ValidationWarning::InvalidDestination {
                index,
                dest: route.dest.clone(),
                reason,
            });
        }

        if route.active {
            match first_active.get(route.source.as_str()) {
                Some(&first) => warnings.push(ValidationWarning::Shadowed {
                    index,
                    first,
                    host: route.source.clone(),
                }),
                None => {
                    first_active.insert(route.source.as_str(), index);
                }
            }
        }
    }

    warnings
}
