//! File import: upload classification and config-document parsing.
//!
//! Two file kinds enter the workbench. A config file (`.json`) is parsed
//! and replaces the whole form state; a presentation file (`.pptx`) is only
//! recorded for later submission and never parsed on this side.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{PulseError, Result};
use crate::persona::{PersonaRecord, DEFAULT_POPULATION_SIZE};

/// What an uploaded file is, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// A saved workbench configuration (`.json`).
    Config,
    /// A PowerPoint deck (`.pptx`).
    Presentation,
}

impl UploadKind {
    /// Classifies a file by its extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Config),
            "pptx" => Ok(Self::Presentation),
            _ => Err(PulseError::invalid_upload(
                "Only .pptx and .json files are allowed",
            )),
        }
    }
}

/// Presentation block of a config document, using wire field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigPresentation {
    #[serde(default)]
    pub ppt_title: String,
    #[serde(default)]
    pub ppt_description: String,
    #[serde(default)]
    pub ppt_intent: String,
}

/// A parsed config file: presentation metadata plus the persona list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub ppt: ConfigPresentation,
    #[serde(default)]
    pub personas: Vec<PersonaRecord>,
}

impl ConfigDocument {
    /// Parses a config document from JSON text.
    ///
    /// Missing fields default; a zero population size is treated as unset.
    /// A parse failure is a single error with nothing partially applied.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut document: Self = serde_json::from_str(text)?;
        for persona in &mut document.personas {
            if persona.population_size == 0 {
                persona.population_size = DEFAULT_POPULATION_SIZE;
            }
        }
        Ok(document)
    }
}
