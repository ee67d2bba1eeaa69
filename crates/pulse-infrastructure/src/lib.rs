//! Infrastructure collaborators: deck extraction and analysis transports.

pub mod extractor;
pub mod http_client;
pub mod mock_analyzer;

pub use extractor::{DeckContent, DeckExtractor};
pub use http_client::HttpAnalysisClient;
pub use mock_analyzer::{LocalAnalysisClient, MockAnalyzer};
