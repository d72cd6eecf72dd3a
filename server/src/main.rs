use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use vercup_config::load as load_config;
use vercup_gateway::{create_router, GatewayState};
use vercup_runtime::{shutdown_signal, telemetry::init_tracing, BackendServices};

#[derive(Parser, Debug)]
#[command(name = "vercup-server")]
#[command(about = "Contact form and chat assistant backend for the Vercup site")]
struct Args {
    /// Configuration file; overrides VERCUP_CONFIG and the default search paths
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `http.address`
    #[arg(long)]
    address: Option<String>,

    /// Listen port, overrides `http.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials usually live in .env next to the binary.
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing()?;

    if let Some(error) = dotenv_failure(&dotenv) {
        warn!(%error, "failed to read .env file; its variables were not loaded");
    }

    info!("starting Vercup backend");

    if let Some(path) = &args.config {
        std::env::set_var("VERCUP_CONFIG", path);
    }

    let mut config = load_config().context("failed to load configuration")?;
    if let Some(address) = args.address {
        config.http.address = address;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    let services =
        BackendServices::initialise(&config).context("failed to initialise backend services")?;

    info!(
        mail_configured = services.notifier.is_configured(),
        chat_enabled = services.assistant.is_some(),
        "backend services ready"
    );

    let state = GatewayState::new(
        services.notifier.clone(),
        services.assistant.clone(),
        Duration::from_secs(config.http.session_idle_seconds),
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

/// A missing `.env` is fine; any other failure is worth reporting.
fn dotenv_failure(result: &Result<PathBuf, dotenvy::Error>) -> Option<&dotenvy::Error> {
    match result {
        Err(error) if !error.not_found() => Some(error),
        _ => None,
    }
}
