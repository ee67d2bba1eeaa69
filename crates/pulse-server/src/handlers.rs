//! HTTP request handlers for the workbench state surface.

use std::path::PathBuf;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use pulse_core::error::PulseError;
use pulse_core::import::{ConfigDocument, UploadKind};
use pulse_core::persona::{PersonaUpdate, PromptField};
use pulse_core::presentation::PresentationUpdate;
use pulse_core::state::{StagedUpload, StateSnapshot};
use pulse_infrastructure::DeckExtractor;

use crate::error::ApiError;
use crate::AppContext;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptEdit {
    field: PromptField,
    value: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenPanelRequest {
    key: String,
}

// ============================================================================
// Health
// ============================================================================

/// GET /health - liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "pulse-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// State surface
// ============================================================================

/// GET /api/state - full snapshot for the render bindings
pub async fn get_state(State(ctx): State<AppContext>) -> Json<StateSnapshot> {
    Json(ctx.state.read().await.snapshot())
}

/// POST /api/personas - append an empty persona
pub async fn add_persona(State(ctx): State<AppContext>) -> Json<StateSnapshot> {
    let mut state = ctx.state.write().await;
    let key = state.add_persona();
    info!("Persona added under key {}", key);
    Json(state.snapshot())
}

/// PATCH /api/personas/{key} - shallow-merge top-level fields
///
/// Unknown keys are ignored, matching the registry's no-op contract.
pub async fn update_persona(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
    Json(update): Json<PersonaUpdate>,
) -> Json<StateSnapshot> {
    let mut state = ctx.state.write().await;
    state.update_persona(&key, update);
    Json(state.snapshot())
}

/// DELETE /api/personas/{key} - remove a persona
pub async fn remove_persona(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
) -> Json<StateSnapshot> {
    let mut state = ctx.state.write().await;
    if state.remove_persona(&key) {
        info!("Persona {} removed", key);
    }
    Json(state.snapshot())
}

/// POST /api/personas/{key}/prompt - write one prompt field through
pub async fn update_prompt(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
    Json(edit): Json<PromptEdit>,
) -> Json<StateSnapshot> {
    let mut state = ctx.state.write().await;
    state.update_prompt(&key, edit.field, edit.value);
    Json(state.snapshot())
}

/// POST /api/panel/open - open the settings panel on a persona
pub async fn open_panel(
    State(ctx): State<AppContext>,
    Json(request): Json<OpenPanelRequest>,
) -> Json<StateSnapshot> {
    let mut state = ctx.state.write().await;
    state.open_panel(&request.key);
    Json(state.snapshot())
}

/// POST /api/panel/close - close the settings panel
pub async fn close_panel(State(ctx): State<AppContext>) -> Json<StateSnapshot> {
    let mut state = ctx.state.write().await;
    state.close_panel();
    Json(state.snapshot())
}

/// POST /api/presentation - merge presentation-info fields
pub async fn update_presentation(
    State(ctx): State<AppContext>,
    Json(update): Json<PresentationUpdate>,
) -> Json<StateSnapshot> {
    let mut state = ctx.state.write().await;
    state.update_presentation(update);
    Json(state.snapshot())
}

// ============================================================================
// Upload
// ============================================================================

/// POST /api/upload - import a config file or stage a presentation
///
/// Config files replace presentation info and the whole registry on success
/// and leave everything untouched on a parse failure. Presentation files
/// are signature-checked, staged, and summarized; their content is not
/// interpreted beyond extraction.
pub async fn upload(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Json<StateSnapshot>, ApiError> {
    let (file_name, bytes) = read_file_field(multipart).await?;
    let kind = UploadKind::from_file_name(&file_name)?;

    match kind {
        UploadKind::Config => {
            let text = std::str::from_utf8(&bytes)
                .map_err(|_| PulseError::invalid_upload("Config file is not valid UTF-8"))?;
            let document = ConfigDocument::from_json(text)?;

            let path = stage_file(&ctx, &file_name, &bytes).await?;
            let mut state = ctx.state.write().await;
            state.import_config(document);
            state.stage_upload(StagedUpload {
                file_name: file_name.clone(),
                kind,
                path,
                summary: None,
            });
            info!(
                "Imported config '{}' with {} personas",
                file_name,
                state.registry.len()
            );
            Ok(Json(state.snapshot()))
        }
        UploadKind::Presentation => {
            DeckExtractor::validate_magic(&bytes)?;
            let path = stage_file(&ctx, &file_name, &bytes).await?;
            let summary = DeckExtractor::extract(&path)?.summary(&file_name);

            let mut state = ctx.state.write().await;
            state.stage_upload(StagedUpload {
                file_name: file_name.clone(),
                kind,
                path,
                summary: Some(summary),
            });
            info!("Staged {} upload '{}'", kind, file_name);
            Ok(Json(state.snapshot()))
        }
    }
}

// ============================================================================
// Run
// ============================================================================

/// POST /api/run - trigger the run controller
pub async fn run(State(ctx): State<AppContext>) -> Result<Json<StateSnapshot>, ApiError> {
    ctx.runner.run(&ctx.state).await?;
    Ok(Json(ctx.state.read().await.snapshot()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Pulls the `file` field out of a multipart body.
pub(crate) async fn read_file_field(
    mut multipart: Multipart,
) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PulseError::invalid_upload(format!("Malformed upload: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| PulseError::invalid_upload(format!("Failed to read upload: {e}")))?;
            return Ok((file_name, bytes.to_vec()));
        }
    }
    Err(PulseError::invalid_upload("No file selected").into())
}

/// Writes upload bytes into the staging directory under a sanitized name.
pub(crate) async fn stage_file(
    ctx: &AppContext,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, ApiError> {
    let path = ctx.staging.path().join(sanitize_file_name(file_name));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(PulseError::from)?;
    Ok(path)
}

/// Keeps file names to a safe character set; path separators and anything
/// exotic become underscores.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
