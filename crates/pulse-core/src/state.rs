//! The workbench state container.
//!
//! One `WorkbenchState` owns everything the form shows: presentation info,
//! the persona registry, the settings-panel selection, the staged upload,
//! the busy flag, and the last run's results. It is passed explicitly to
//! every handler; nothing reads it through a global.

use std::path::PathBuf;

use serde::Serialize;

use crate::import::{ConfigDocument, UploadKind};
use crate::panel::PanelState;
use crate::persona::{PersonaRecord, PersonaRegistry, PersonaUpdate, PromptField};
use crate::presentation::{PresentationInfo, PresentationUpdate};
use crate::render::{render_results, RenderedPersona};
use crate::run::AnalysisResults;

/// An uploaded file staged on disk for later submission.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub file_name: String,
    pub kind: UploadKind,
    pub path: PathBuf,
    /// Extraction summary shown after a presentation upload.
    pub summary: Option<String>,
}

/// All transient state of one workbench.
///
/// Nothing here survives a restart; state is rebuilt by importing a file.
#[derive(Debug, Default)]
pub struct WorkbenchState {
    pub presentation: PresentationInfo,
    pub registry: PersonaRegistry,
    pub panel: PanelState,
    pub upload: Option<StagedUpload>,
    pub busy: bool,
    pub results: Option<AnalysisResults>,
}

impl WorkbenchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces presentation info and the registry wholesale from a parsed
    /// config document. The panel closes: its selection belonged to the
    /// registry that was just thrown away.
    pub fn import_config(&mut self, document: ConfigDocument) {
        self.presentation = PresentationInfo {
            title: document.ppt.ppt_title,
            description: document.ppt.ppt_description,
            intent: document.ppt.ppt_intent,
        };
        self.registry.rebuild_from(document.personas);
        self.panel.close();
        self.results = None;
    }

    /// Appends an empty persona and returns its key.
    pub fn add_persona(&mut self) -> String {
        self.registry.add()
    }

    /// Removes a persona; when it was the open one, the panel closes.
    pub fn remove_persona(&mut self, key: &str) -> bool {
        let removed = self.registry.remove(key);
        if removed {
            self.panel.clear_if(key);
        }
        removed
    }

    /// Shallow-merges top-level persona fields.
    pub fn update_persona(&mut self, key: &str, update: PersonaUpdate) -> bool {
        self.registry.update(key, update)
    }

    /// Writes through one prompt field, resetting the affected results.
    pub fn update_prompt(&mut self, key: &str, field: PromptField, value: String) -> bool {
        self.registry.update_prompt(key, field, value)
    }

    /// Opens the panel on an existing persona; unknown keys are ignored.
    pub fn open_panel(&mut self, key: &str) -> bool {
        if self.registry.get(key).is_some() {
            self.panel.open(key);
            true
        } else {
            false
        }
    }

    pub fn close_panel(&mut self) {
        self.panel.close();
    }

    pub fn update_presentation(&mut self, update: PresentationUpdate) {
        self.presentation.apply(update);
    }

    /// Records the staged upload, replacing any previous one.
    pub fn stage_upload(&mut self, upload: StagedUpload) {
        self.upload = Some(upload);
    }

    /// Builds the serializable view the render bindings work from.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            presentation: self.presentation.clone(),
            personas: self
                .registry
                .iter()
                .map(|(key, persona)| PersonaEntry {
                    key: key.to_string(),
                    persona: persona.clone(),
                })
                .collect(),
            open_persona: self.panel.selection().map(str::to_string),
            busy: self.busy,
            upload: self.upload.as_ref().map(|upload| UploadView {
                file_name: upload.file_name.clone(),
                kind: upload.kind,
                summary: upload.summary.clone(),
            }),
            results: self.results.clone(),
            rendered: self
                .results
                .as_ref()
                .map(render_results)
                .unwrap_or_default(),
        }
    }
}

/// One registry entry in a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaEntry {
    pub key: String,
    pub persona: PersonaRecord,
}

/// Snapshot view of a staged upload (staging paths stay server-side).
#[derive(Debug, Clone, Serialize)]
pub struct UploadView {
    pub file_name: String,
    pub kind: UploadKind,
    pub summary: Option<String>,
}

/// Full serializable view of the workbench for render bindings.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub presentation: PresentationInfo,
    pub personas: Vec<PersonaEntry>,
    pub open_persona: Option<String>,
    pub busy: bool,
    pub upload: Option<UploadView>,
    pub results: Option<AnalysisResults>,
    pub rendered: Vec<RenderedPersona>,
}
