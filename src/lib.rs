//! Host-based reverse proxy with an interactive route editor.

pub mod config;
pub mod editor;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::Config;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Route, RouteTable};
