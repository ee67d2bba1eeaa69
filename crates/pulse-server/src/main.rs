//! Pulse workbench server - main entry point.
//!
//! Serves the workbench UI, the state API, and the scaffolding analysis
//! endpoint on a single port.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_core::run::{AnalysisClient, RunService};
use pulse_infrastructure::{HttpAnalysisClient, LocalAnalysisClient};
use pulse_server::{build_router, AppContext};

/// Command-line arguments for pulse-server
#[derive(Parser, Debug)]
#[command(name = "pulse-server")]
#[command(about = "Pulse workbench server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5170", env = "PULSE_PORT")]
    port: u16,

    /// External analysis endpoint URL; the built-in scaffolding analyzer
    /// answers runs when unset
    #[arg(long, env = "PULSE_ANALYSIS_URL")]
    analysis_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_server=debug,pulse_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let client: Arc<dyn AnalysisClient> = match &args.analysis_url {
        Some(url) => {
            info!("Submitting runs to external analysis endpoint {}", url);
            Arc::new(HttpAnalysisClient::new(url.clone()))
        }
        None => {
            info!("No analysis endpoint configured; using built-in scaffolding analyzer");
            Arc::new(LocalAnalysisClient::new())
        }
    };

    let ctx = AppContext::new(RunService::new(client))
        .context("Failed to initialize workbench context")?;
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting Pulse workbench on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
