//! pawa-mcp: MCP servers for pawaPay and LettsCore
//!
//! Usage:
//!   pawa-mcp sse [--config pawa.toml] [--host 0.0.0.0] [--port 3000]
//!   pawa-mcp stdio [--config pawa.toml]
//!
//! `sse` serves the pawaPay tools to any number of clients; each client may
//! pass its own API key as `GET /sse?key=...`. `stdio` serves the LettsCore
//! tools to the single client on stdin/stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pawa_core::Config;
use pawa_core::catalog;
use pawa_core::config::{DEFAULT_LETTSCORE_SERVER_NAME, DEFAULT_PAWAPAY_SERVER_NAME};
use pawa_core::lettscore::LettsCoreClient;
use pawa_core::pawapay::PawaPayClient;
use pawa_gateway::GatewayServer;
use pawa_mcp::{McpHandler, McpServer};

#[derive(Parser)]
#[command(name = "pawa-mcp", version, about = "MCP servers for pawaPay and LettsCore")]
struct Cli {
    /// Path to a TOML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the pawaPay catalog over HTTP + Server-Sent Events
    Sse {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Serve the LettsCore catalog over stdin/stdout
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the STDIO transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Sse { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_sse(config).await
        }
        Command::Stdio => run_stdio(config).await,
    }
}

async fn run_sse(config: Config) -> Result<()> {
    let api_url = config.pawapay_api_url()?;
    let default_credential = config.pawapay_credential();
    if default_credential.is_none() {
        warn!("PAWAPAY_API_KEY not set; sessions without ?key= will call pawaPay unauthenticated");
    }

    let catalog = catalog::pawapay::catalog(PawaPayClient::new(&api_url));
    let handler = McpHandler::new(
        Arc::new(catalog),
        config.server_name(DEFAULT_PAWAPAY_SERVER_NAME),
        config.server.version.clone(),
    );
    info!("pawaPay API at {}", api_url);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
        signal.cancel();
    });

    GatewayServer::new(Arc::new(handler), default_credential, shutdown)
        .serve(&config.bind_address())
        .await
}

async fn run_stdio(config: Config) -> Result<()> {
    let (api_url, token) = config
        .lettscore_settings()
        .context("LettsCore settings are required for STDIO mode")?;

    let catalog = catalog::lettscore::catalog(LettsCoreClient::new(&api_url));
    let handler = McpHandler::new(
        Arc::new(catalog),
        config.server_name(DEFAULT_LETTSCORE_SERVER_NAME),
        config.server.version.clone(),
    );

    McpServer::new(handler, Some(token)).serve_stdio().await
}
