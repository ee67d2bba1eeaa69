//! `pulse run` - run an analysis from a saved config.
//!
//! Builds a workbench state from the config file, stages the optional deck,
//! and drives the same run controller the server uses. Results land in a
//! fresh per-run directory.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use pulse_core::import::{ConfigDocument, UploadKind};
use pulse_core::run::{AnalysisClient, RunService};
use pulse_core::state::{StagedUpload, WorkbenchState};
use pulse_infrastructure::{DeckExtractor, HttpAnalysisClient, LocalAnalysisClient};

pub async fn run(
    config: &Path,
    deck: Option<&Path>,
    server: Option<&str>,
    out: &Path,
) -> Result<()> {
    let text = std::fs::read_to_string(config)
        .with_context(|| format!("Failed to read config {}", config.display()))?;
    let document = ConfigDocument::from_json(&text)?;

    let mut state = WorkbenchState::new();
    state.import_config(document);
    info!("Loaded config with {} personas", state.registry.len());

    let staged = match deck {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read deck {}", path.display()))?;
            DeckExtractor::validate_magic(&bytes)?;
            StagedUpload {
                file_name: file_name_of(path),
                kind: UploadKind::Presentation,
                path: path.to_path_buf(),
                summary: None,
            }
        }
        // The config itself is the submitted file when no deck is given.
        None => StagedUpload {
            file_name: file_name_of(config),
            kind: UploadKind::Config,
            path: config.to_path_buf(),
            summary: None,
        },
    };
    state.stage_upload(staged);

    let client: Arc<dyn AnalysisClient> = match server {
        Some(url) => {
            info!("Submitting to {}", url);
            Arc::new(HttpAnalysisClient::new(url))
        }
        None => {
            info!("No server given; using the built-in scaffolding analyzer");
            Arc::new(LocalAnalysisClient::new())
        }
    };

    let state = Arc::new(RwLock::new(state));
    let results = RunService::new(client).run(&state).await?;

    let run_dir = out.join(Uuid::new_v4().to_string());
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create {}", run_dir.display()))?;
    let results_path = run_dir.join("results.json");
    std::fs::write(&results_path, serde_json::to_string_pretty(&results)?)?;

    println!(
        "Results for {} personas written to {}",
        results.personas.len(),
        results_path.display()
    );
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
