//! The analysis collaborator boundary.
//!
//! `POST /run_analysis` is the endpoint the run controller submits to. The
//! analysis process itself is external to this repository; this handler is
//! scaffolding that stages the upload, extracts real deck content, and
//! answers with mock per-persona results. It deliberately shares no
//! workbench state with the handlers in [`crate::handlers`] — to the run
//! controller it is a remote service that happens to live in-process.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use pulse_core::error::PulseError;
use pulse_core::persona::PersonaRecord;
use pulse_core::presentation::PresentationUpdate;
use pulse_core::run::{AnalysisRequest, AnalysisResults};
use pulse_infrastructure::MockAnalyzer;

use crate::error::ApiError;
use crate::handlers::stage_file;
use crate::AppContext;

/// POST /run_analysis - run an analysis over the submitted form
///
/// Multipart fields: `file` (required), `ppt_title`, `ppt_description`,
/// `ppt_intent`, and `personas` as a JSON-encoded array.
pub async fn run_analysis(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResults>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut ppt_title = String::new();
    let mut ppt_description = String::new();
    let mut ppt_intent = String::new();
    let mut personas: Vec<PersonaRecord> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PulseError::invalid_upload(format!("Malformed request: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    PulseError::invalid_upload(format!("Failed to read upload: {e}"))
                })?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("ppt_title") => ppt_title = read_text(field).await?,
            Some("ppt_description") => ppt_description = read_text(field).await?,
            Some("ppt_intent") => ppt_intent = read_text(field).await?,
            Some("personas") => {
                let text = read_text(field).await?;
                personas = serde_json::from_str(&text).map_err(|e| {
                    PulseError::validation(format!("Invalid personas payload: {e}"))
                })?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| PulseError::validation("No file uploaded"))?;
    let path = stage_file(&ctx, &file_name, &bytes).await?;

    info!(
        "Analysis run for '{}' with {} personas",
        file_name,
        personas.len()
    );

    let results = MockAnalyzer::analyze(&AnalysisRequest {
        ppt_name: file_name,
        ppt_file: Some(path),
        ppt_title,
        ppt_description,
        ppt_intent,
        personas,
    })?;

    Ok(Json(results))
}

/// Body of the legacy presentation-info path.
#[derive(Debug, Deserialize)]
pub struct LegacyPresentationInfo {
    #[serde(default)]
    pub ppt_name: String,
    #[serde(default)]
    pub ppt_file: String,
    #[serde(default)]
    pub ppt_title: String,
    #[serde(default)]
    pub ppt_description: String,
    #[serde(default)]
    pub ppt_intent: String,
    #[serde(default)]
    pub personas: Vec<PersonaRecord>,
}

/// POST /update_presentation_info - legacy JSON path
///
/// The old form posted its whole state here before a run. Only the
/// presentation fields carry information the workbench keeps; the rest of
/// the body is accepted and acknowledged.
pub async fn update_presentation_info(
    State(ctx): State<AppContext>,
    Json(body): Json<LegacyPresentationInfo>,
) -> Json<serde_json::Value> {
    let mut state = ctx.state.write().await;
    state.update_presentation(PresentationUpdate {
        title: Some(body.ppt_title),
        description: Some(body.ppt_description),
        intent: Some(body.ppt_intent),
    });
    Json(json!({ "status": "success" }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| PulseError::invalid_upload(format!("Failed to read field: {e}")).into())
}
