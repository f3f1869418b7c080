//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header)
//!     → matcher.rs (extract + lowercase host)
//!     → table.rs (first active route with equal source)
//!     → destination.rs (parse dest as absolute http(s) URL)
//!     → Return: upstream base URL or explicit NoMatch
//!
//! Editor mutation:
//!     table.rs write guard (add / delete / toggle)
//!     → config store persists while the guard is held
//! ```
//!
//! # Design Decisions
//! - One read/write lock guards the whole table
//! - Lookups hold the read lock for the scan only, never across backend I/O
//! - Exact host match, no wildcards
//! - First match wins (table order)

pub mod destination;
pub mod matcher;
pub mod table;

pub use destination::{parse_destination, DestinationError};
pub use matcher::{normalize_host, request_host};
pub use table::{Route, RouteError, RouteTable, RouteTableWriter};
