//! HTTP transport towards a remote analysis endpoint.
//!
//! Submits the run as the multipart form the endpoint expects: the staged
//! file plus presentation metadata, with the persona list JSON-encoded into
//! a single field.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use pulse_core::error::{PulseError, Result};
use pulse_core::run::{AnalysisClient, AnalysisRequest, AnalysisResults};

/// Error body shape of the analysis endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`AnalysisClient`] over HTTP.
pub struct HttpAnalysisClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpAnalysisClient {
    /// Creates a client posting to the given `run_analysis` URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResults> {
        let personas_json = serde_json::to_string(&request.personas)?;

        let mut form = Form::new()
            .text("ppt_title", request.ppt_title)
            .text("ppt_description", request.ppt_description)
            .text("ppt_intent", request.ppt_intent)
            .text("personas", personas_json);

        if let Some(path) = &request.ppt_file {
            let bytes = tokio::fs::read(path).await?;
            form = form.part("file", Part::bytes(bytes).file_name(request.ppt_name.clone()));
        }

        debug!(endpoint = %self.endpoint, "Submitting analysis run");
        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PulseError::analysis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("endpoint returned status {status}"));
            return Err(PulseError::analysis(message));
        }

        response
            .json::<AnalysisResults>()
            .await
            .map_err(|e| PulseError::analysis(format!("malformed response: {e}")))
    }
}
