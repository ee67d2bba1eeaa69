//! Persona domain model.
//!
//! A persona is one configured audience viewpoint: who it represents, the
//! prompt templates it runs with, the size of its simulated population, and
//! the analysis/QnA output of the last completed run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Population size used when none is configured.
pub const DEFAULT_POPULATION_SIZE: u32 = 5;

fn default_population_size() -> u32 {
    DEFAULT_POPULATION_SIZE
}

/// One simulated member of a persona's population.
///
/// Agents are read-only from the workbench's perspective: they are populated
/// only by importing a saved configuration or by a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub agent_description: String,
    #[serde(default)]
    pub agent_file: String,
}

/// Prompt configuration and results for the analysis pass of a persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    #[serde(default)]
    pub analysis_prompt: String,
    #[serde(default)]
    pub analysis_gpt_prompt: String,
    #[serde(default)]
    pub extracted_result: Map<String, Value>,
    #[serde(default)]
    pub combined_result: String,
}

impl AnalysisSection {
    /// True when both the extracted map and the combined text are populated.
    pub fn has_results(&self) -> bool {
        !self.extracted_result.is_empty() && !self.combined_result.is_empty()
    }

    /// Drops any previously produced results.
    pub fn clear_results(&mut self) {
        self.extracted_result = Map::new();
        self.combined_result.clear();
    }
}

/// Prompt configuration and results for the QnA pass of a persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QnaSection {
    #[serde(default)]
    pub qna_prompt: String,
    #[serde(default)]
    pub qna_gpt_prompt: String,
    #[serde(default)]
    pub extracted_result: Map<String, Value>,
    #[serde(default)]
    pub combined_result: String,
}

impl QnaSection {
    /// True when both the extracted map and the combined text are populated.
    pub fn has_results(&self) -> bool {
        !self.extracted_result.is_empty() && !self.combined_result.is_empty()
    }

    /// Drops any previously produced results.
    pub fn clear_results(&mut self) {
        self.extracted_result = Map::new();
        self.combined_result.clear();
    }
}

/// A configured audience persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaRecord {
    /// Opaque identifier; absent until assigned by an external process.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub persona_prompt: String,
    #[serde(default)]
    pub persona_gpt_prompt: String,
    #[serde(default = "default_population_size")]
    pub population_size: u32,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub qna: QnaSection,
}

impl Default for PersonaRecord {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            persona_prompt: String::new(),
            persona_gpt_prompt: String::new(),
            population_size: DEFAULT_POPULATION_SIZE,
            agents: Vec::new(),
            analysis: AnalysisSection::default(),
            qna: QnaSection::default(),
        }
    }
}

impl PersonaRecord {
    /// Creates a new, empty persona with defaulted settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when both the analysis and QnA sections carry complete results.
    pub fn has_all_results(&self) -> bool {
        self.analysis.has_results() && self.qna.has_results()
    }
}

/// Which result-bearing section of a persona a prompt field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSection {
    Analysis,
    Qna,
}

/// An editable prompt field of a persona.
///
/// The wire names follow the field-name prefix convention: `analysis_*`
/// fields route into the analysis section, `qna_*` fields into the QnA
/// section, and `persona_*` fields stay on the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptField {
    PersonaPrompt,
    PersonaGptPrompt,
    AnalysisPrompt,
    AnalysisGptPrompt,
    QnaPrompt,
    QnaGptPrompt,
}

impl PromptField {
    /// The section a field routes into, or `None` for persona-level prompts.
    pub fn section(&self) -> Option<ResultSection> {
        match self {
            Self::AnalysisPrompt | Self::AnalysisGptPrompt => Some(ResultSection::Analysis),
            Self::QnaPrompt | Self::QnaGptPrompt => Some(ResultSection::Qna),
            Self::PersonaPrompt | Self::PersonaGptPrompt => None,
        }
    }
}

/// Partial top-level update of a persona, shallow-merged over the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub population_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let persona = PersonaRecord::new();
        assert!(persona.id.is_none());
        assert_eq!(persona.population_size, DEFAULT_POPULATION_SIZE);
        assert!(persona.agents.is_empty());
        assert!(!persona.has_all_results());
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        let persona: PersonaRecord =
            serde_json::from_value(json!({ "name": "Skeptic" })).unwrap();
        assert_eq!(persona.name, "Skeptic");
        assert_eq!(persona.population_size, DEFAULT_POPULATION_SIZE);
        assert_eq!(persona.analysis.combined_result, "");
        assert_eq!(persona.qna.combined_result, "");
    }

    #[test]
    fn test_section_completeness() {
        let mut section = AnalysisSection::default();
        assert!(!section.has_results());

        section.combined_result = "combined".to_string();
        assert!(!section.has_results());

        section
            .extracted_result
            .insert("sentiment".to_string(), json!("positive"));
        assert!(section.has_results());

        section.clear_results();
        assert!(!section.has_results());
        assert!(section.extracted_result.is_empty());
    }

    #[test]
    fn test_prompt_field_routing() {
        assert_eq!(
            PromptField::AnalysisPrompt.section(),
            Some(ResultSection::Analysis)
        );
        assert_eq!(PromptField::QnaGptPrompt.section(), Some(ResultSection::Qna));
        assert_eq!(PromptField::PersonaPrompt.section(), None);
    }

    #[test]
    fn test_prompt_field_wire_names() {
        let field: PromptField = serde_json::from_value(json!("analysis_gpt_prompt")).unwrap();
        assert_eq!(field, PromptField::AnalysisGptPrompt);
        assert_eq!(
            serde_json::to_value(PromptField::QnaPrompt).unwrap(),
            json!("qna_prompt")
        );
    }
}
