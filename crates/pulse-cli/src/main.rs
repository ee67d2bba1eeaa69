use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Pulse CLI - simulated audience feedback for presentations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text, notes, and media names from a PowerPoint file
    Extract {
        /// Path to the .pptx file
        deck: PathBuf,

        /// Print the full content map as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Run an analysis from a saved config file
    Run {
        /// Path to the config .json
        #[arg(long)]
        config: PathBuf,

        /// Presentation file to submit alongside the config
        #[arg(long)]
        deck: Option<PathBuf>,

        /// run_analysis URL of an analysis server; the built-in
        /// scaffolding analyzer answers when unset
        #[arg(long)]
        server: Option<String>,

        /// Directory results are written into
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },

    /// Render a results document to a standalone HTML report
    Render {
        /// Path to a results .json produced by `pulse run`
        results: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "pulse_report.html")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "pulse=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { deck, json } => commands::extract::run(&deck, json),
        Commands::Run {
            config,
            deck,
            server,
            out,
        } => commands::run::run(&config, deck.as_deref(), server.as_deref(), &out).await,
        Commands::Render { results, out } => commands::render::run(&results, &out),
    }
}
