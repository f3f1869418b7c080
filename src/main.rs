//! portal: host-based reverse proxy with a live route editor.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                        PORTAL                        │
//!                 │                                                      │
//!   Client ───────┼─▶ net ──▶ http server ──▶ routing ──▶ http forward ──┼──▶ Backend
//!   Request       │  listener  (request id,   table       (hyper client, │
//!                 │  / TLS      trace)        lookup       X-Forwarded-*) │
//!                 │                              ▲                       │
//!                 │                              │ read lock per lookup  │
//!                 │                              │                       │
//!   Operator ─────┼─▶ editor (ratatui) ────▶ config ──▶ config.json      │
//!   keys          │   list / add screens    write lock + save            │
//!                 └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Commands
//! - `serve` (`s`): serve the routes in `--file`
//! - `interactive` (`i`): serve and edit the routes in a terminal UI
//! - `template` (`t`): write a starter route file

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use portal::config::generate_template;
use portal::editor;
use portal::lifecycle::{self, Shutdown, Startup, StartupOptions};
use portal::observability::logging::{self, LogTarget};
use portal::observability::metrics;
use portal::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "portal", version)]
#[command(about = "Host-based reverse proxy with a live route editor", long_about = None)]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this address
    #[arg(long, global = true)]
    metrics_address: Option<SocketAddr>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the routes
    #[command(visible_alias = "s")]
    Serve(ServeArgs),
    /// Serve the routes and edit them in a terminal UI
    #[command(visible_alias = "i")]
    Interactive(ServeArgs),
    /// Write a starter configuration file
    #[command(visible_alias = "t")]
    Template(TemplateArgs),
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// The configuration file
    #[arg(long, default_value = "config.json")]
    file: PathBuf,

    /// The TLS certificate
    #[arg(long)]
    cert: Option<PathBuf>,

    /// The private key of the certificate
    #[arg(long)]
    key: Option<PathBuf>,
}

impl From<ServeArgs> for StartupOptions {
    fn from(args: ServeArgs) -> Self {
        Self {
            config_path: args.file,
            cert_path: args.cert,
            key_path: args.key,
        }
    }
}

#[derive(Debug, Args)]
struct TemplateArgs {
    /// Where to write the template
    #[arg(long, default_value = "config.json")]
    file: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The editor owns the terminal, so interactive logs never go to stderr
    let target = match (cli.log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path),
        (None, Command::Interactive(_)) => LogTarget::Discard,
        (None, _) => LogTarget::Stderr,
    };
    logging::init(target)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "portal starting");

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr);
    }

    match cli.command {
        Command::Serve(args) => serve(args.into()).await,
        Command::Interactive(args) => interactive(args.into()).await,
        Command::Template(args) => Ok(generate_template(&args.file, args.force)?),
    }
}

async fn serve(options: StartupOptions) -> Result<(), Box<dyn std::error::Error>> {
    let Startup {
        config,
        transport,
        listener,
    } = lifecycle::prepare(&options).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, transport).run(listener, shutdown.subscribe());
    shutdown.trigger_on_signal();

    server.await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn interactive(options: StartupOptions) -> Result<(), Box<dyn std::error::Error>> {
    let Startup {
        config,
        transport,
        listener,
    } = lifecycle::prepare(&options).await?;
    let port = config.port();

    let shutdown = Shutdown::new();
    let server = tokio::spawn(
        HttpServer::new(Arc::clone(&config), transport).run(listener, shutdown.subscribe()),
    );
    shutdown.trigger_on_signal();

    match tokio::task::spawn_blocking(move || editor::run(config)).await? {
        Ok(()) => {}
        Err(e) => tracing::error!(error = %e, "Editor failed"),
    }

    tracing::info!(port, "Editor closed, still serving");
    eprintln!("Editor closed. Still serving on port {}; press Ctrl+C to stop.", port);

    server.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
