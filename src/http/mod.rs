//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, trace)
//!     → routing (host → destination)
//!     → forward.rs (upstream URI) + headers.rs (hop-by-hop, X-Forwarded-*)
//!     → backend
//!     → response.rs (dispatch failures → 404 / 500 / 502)
//!     → Send to client
//! ```

pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::DispatchError;
pub use server::{HttpServer, ServeError};
