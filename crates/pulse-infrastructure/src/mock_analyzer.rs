//! Scaffolding analyzer.
//!
//! The real analysis process (persona populations run against language
//! models) lives outside this repository. This analyzer stands in for it:
//! it extracts genuine deck content when a `.pptx` is submitted, but fills
//! every persona with a fixed mock payload so the rest of the system can be
//! exercised end to end.

use serde_json::{json, Map};

use pulse_core::error::Result;
use pulse_core::presentation::PresentationDetails;
use pulse_core::run::{AnalysisClient, AnalysisRequest, AnalysisResults};

use crate::extractor::DeckExtractor;

pub const MOCK_ANALYSIS_RESULT: &str = "Mock analysis result";
pub const MOCK_QNA_RESULT: &str = "Mock QnA result";

/// Produces canned analysis results over real deck content.
pub struct MockAnalyzer;

impl MockAnalyzer {
    /// Answers a run request with extracted content and mock results.
    pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisResults> {
        let deck_path = request
            .ppt_file
            .as_deref()
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pptx"))
            });

        let ppt_content = match deck_path {
            Some(path) => DeckExtractor::extract(path)?.to_content_map(),
            None => Map::new(),
        };

        let personas = request
            .personas
            .iter()
            .cloned()
            .map(|mut persona| {
                persona.analysis.extracted_result = mock_analysis_extract();
                persona.analysis.combined_result = MOCK_ANALYSIS_RESULT.to_string();
                persona.qna.extracted_result = mock_qna_extract();
                persona.qna.combined_result = MOCK_QNA_RESULT.to_string();
                persona
            })
            .collect();

        Ok(AnalysisResults {
            ppt: PresentationDetails {
                ppt_id: None,
                ppt_name: request.ppt_name.clone(),
                ppt_file: deck_path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| request.ppt_name.clone()),
                ppt_title: request.ppt_title.clone(),
                ppt_description: request.ppt_description.clone(),
                ppt_intent: request.ppt_intent.clone(),
                ppt_content,
            },
            personas,
        })
    }
}

fn mock_analysis_extract() -> Map<String, serde_json::Value> {
    let mut map = Map::new();
    map.insert(
        "key_points".to_string(),
        json!(["Mock point 1", "Mock point 2"]),
    );
    map.insert("sentiment".to_string(), json!("positive"));
    map
}

fn mock_qna_extract() -> Map<String, serde_json::Value> {
    let mut map = Map::new();
    map.insert("questions".to_string(), json!(["Mock Q1", "Mock Q2"]));
    map.insert("answers".to_string(), json!(["Mock A1", "Mock A2"]));
    map
}

/// In-process [`AnalysisClient`] backed by [`MockAnalyzer`].
///
/// Used when no external analysis endpoint is configured, so the run
/// controller exercises the same seam either way.
#[derive(Debug, Default)]
pub struct LocalAnalysisClient;

impl LocalAnalysisClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl AnalysisClient for LocalAnalysisClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResults> {
        MockAnalyzer::analyze(&request)
    }
}
