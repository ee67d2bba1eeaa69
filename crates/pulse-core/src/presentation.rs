//! Presentation metadata models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The three user-editable facts about the uploaded presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub intent: String,
}

impl PresentationInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-merges the given partial fields.
    pub fn apply(&mut self, update: PresentationUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(intent) = update.intent {
            self.intent = intent;
        }
    }
}

/// Partial update of [`PresentationInfo`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresentationUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub intent: Option<String>,
}

/// Full presentation record as it travels over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationDetails {
    #[serde(default)]
    pub ppt_id: Option<String>,
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
    pub ppt_content: Map<String, Value>,
}
