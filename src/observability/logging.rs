//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level from `RUST_LOG`, defaulting to `portal=info,tower_http=info`
//! - While the terminal editor owns the screen, logs go to a file or nowhere

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "portal=info,tower_http=info";

/// Where log lines are written.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Appended to, created if missing.
    File(PathBuf),
    Discard,
}

/// Initialize the global tracing subscriber.
pub fn init(target: LogTarget) -> io::Result<()> {
    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        LogTarget::Discard => (BoxMakeWriter::new(io::sink), false),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(ansi))
        .init();

    Ok(())
}
