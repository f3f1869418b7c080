//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! --cert / --key flags
//!     → tls.rs (plain or rustls, PEM parsed before serving)
//! config port
//!     → listener.rs (bind 0.0.0.0:{port})
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;

pub use listener::{bind, listen_addr, ListenerError};
pub use tls::{load_tls_config, TlsError, TlsMode, Transport};
