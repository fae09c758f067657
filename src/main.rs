//! Language redirect interceptor
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────┐
//!                          │              LANGUAGE REDIRECT                │
//!     Client Request       │  ┌────────┐   ┌──────────┐   ┌────────────┐   │
//!     ─────────────────────┼─▶│  http  │──▶│ pipeline │──▶│   cache    │   │
//!                          │  │ server │   │  guards  │   │ (url+lang) │   │
//!                          │  └────────┘   └────┬─────┘   └────────────┘   │
//!                          │                    │                          │
//!                          │         ┌──────────┼───────────┐              │
//!                          │         ▼          ▼           ▼              │
//!                          │   ┌──────────┐ ┌────────┐ ┌──────────┐        │
//!                          │   │ language │ │routing │ │ currency │        │
//!                          │   └──────────┘ └────────┘ └──────────┘        │
//!     Client Response      │                    │                          │
//!     ◀────────────────────┼── 302 | origin ◀───┴──── http origin ◀────────┼──── Website
//!                          └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use lang_redirect::config::{load_config, ProxyConfig};
use lang_redirect::lifecycle::{wait_for_signal, Shutdown};
use lang_redirect::observability::{logging, metrics};
use lang_redirect::HttpServer;

#[derive(Parser)]
#[command(name = "lang-redirect")]
#[command(about = "Accept-Language redirect interceptor for multilingual sites", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "LANG_REDIRECT_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);

    if cli.check {
        println!("configuration ok");
        return Ok(());
    }

    tracing::info!("lang-redirect v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.address,
        default_language = %config.language.default_language,
        supported_languages = ?config.language.supported_languages,
        currency_enabled = config.currency.enabled,
        cache_enabled = config.cache.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.trigger();
        }
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
