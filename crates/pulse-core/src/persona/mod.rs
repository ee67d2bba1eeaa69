//! Persona domain: records, prompt routing, and the registry.

mod model;
mod registry;

pub use model::{
    Agent, AnalysisSection, PersonaRecord, PersonaUpdate, PromptField, QnaSection, ResultSection,
    DEFAULT_POPULATION_SIZE,
};
pub use registry::PersonaRegistry;
