//! Persona registry.
//!
//! The registry is the single source of truth for the persona form: an
//! insertion-ordered collection of [`PersonaRecord`]s addressed by stable
//! string keys. Keys come from a monotonic counter and are never renumbered
//! or reused after a removal, so a key held by a caller stays valid for the
//! lifetime of its record and dangles harmlessly afterwards.

use super::model::{PersonaRecord, PersonaUpdate, PromptField, ResultSection};

/// Insertion-ordered persona collection with stable keys.
///
/// Every mutating operation on a key that no longer exists is a silent
/// no-op; callers that care can check the returned flag.
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    entries: Vec<(String, PersonaRecord)>,
    next_key: u64,
}

impl PersonaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a record by key.
    pub fn get(&self, key: &str) -> Option<&PersonaRecord> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut PersonaRecord> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PersonaRecord)> {
        self.entries.iter().map(|(k, record)| (k.as_str(), record))
    }

    /// Clones the records in insertion order, dropping the keys.
    pub fn records(&self) -> Vec<PersonaRecord> {
        self.entries.iter().map(|(_, record)| record.clone()).collect()
    }

    /// Appends a new empty persona and returns its key.
    pub fn add(&mut self) -> String {
        let key = self.next_key.to_string();
        self.next_key += 1;
        self.entries.push((key.clone(), PersonaRecord::new()));
        key
    }

    /// Removes the keyed persona. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    /// Shallow-merges partial top-level fields into the keyed persona.
    pub fn update(&mut self, key: &str, update: PersonaUpdate) -> bool {
        let Some(record) = self.get_mut(key) else {
            return false;
        };
        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(description) = update.description {
            record.description = description;
        }
        if let Some(population_size) = update.population_size {
            record.population_size = population_size;
        }
        true
    }

    /// Writes one prompt field of the keyed persona and applies the
    /// reset-results rule: the results of the section the field routes into
    /// no longer correspond to the configuration and are dropped.
    /// Persona-level prompts feed both passes, so both sections reset.
    pub fn update_prompt(&mut self, key: &str, field: PromptField, value: String) -> bool {
        let Some(record) = self.get_mut(key) else {
            return false;
        };
        match field {
            PromptField::PersonaPrompt => record.persona_prompt = value,
            PromptField::PersonaGptPrompt => record.persona_gpt_prompt = value,
            PromptField::AnalysisPrompt => record.analysis.analysis_prompt = value,
            PromptField::AnalysisGptPrompt => record.analysis.analysis_gpt_prompt = value,
            PromptField::QnaPrompt => record.qna.qna_prompt = value,
            PromptField::QnaGptPrompt => record.qna.qna_gpt_prompt = value,
        }
        match field.section() {
            Some(ResultSection::Analysis) => record.analysis.clear_results(),
            Some(ResultSection::Qna) => record.qna.clear_results(),
            None => {
                record.analysis.clear_results();
                record.qna.clear_results();
            }
        }
        true
    }

    /// Replaces the whole registry with imported personas, keyed by their
    /// array index. The counter restarts past the imported range.
    pub fn rebuild_from(&mut self, personas: Vec<PersonaRecord>) {
        self.entries = personas
            .into_iter()
            .enumerate()
            .map(|(index, record)| (index.to_string(), record))
            .collect();
        self.next_key = self.entries.len() as u64;
    }

    /// Merges the result-bearing parts of a run response back into the
    /// registry, pairing response personas with entries positionally.
    pub fn apply_results(&mut self, personas: &[PersonaRecord]) {
        for ((_, record), response) in self.entries.iter_mut().zip(personas) {
            record.id = response.id.clone();
            record.agents = response.agents.clone();
            record.analysis = response.analysis.clone();
            record.qna = response.qna.clone();
        }
    }

    /// True when every persona carries complete analysis and QnA results.
    ///
    /// Vacuously true for an empty registry; the run controller layers its
    /// own zero-persona convention on top (see [`crate::run`]).
    pub fn all_results_present(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, record)| record.has_all_results())
    }
}
