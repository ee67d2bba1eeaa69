//! Run controller.
//!
//! Decides whether a run can be answered from results the workbench already
//! holds, or has to be submitted to the analysis endpoint, and keeps the
//! busy flag honest on every path. Submission goes through the
//! [`AnalysisClient`] trait so the transport (HTTP, in-process mock) stays
//! out of the core.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Map;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{PulseError, Result};
use crate::persona::{PersonaRecord, PersonaRegistry};
use crate::presentation::PresentationDetails;
use crate::state::WorkbenchState;

/// Fixed delay substituting for the network call when existing results are
/// replayed.
pub const REPLAY_DELAY: Duration = Duration::from_secs(5);

/// Everything submitted to the analysis endpoint for one run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ppt_name: String,
    /// Staged file to submit, when one exists on disk.
    pub ppt_file: Option<PathBuf>,
    pub ppt_title: String,
    pub ppt_description: String,
    pub ppt_intent: String,
    pub personas: Vec<PersonaRecord>,
}

/// Structured response of a completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub ppt: PresentationDetails,
    pub personas: Vec<PersonaRecord>,
}

/// Transport boundary towards the analysis process.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Submits a run and awaits the populated response.
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResults>;
}

/// Completeness predicate over the registry.
///
/// True when every persona carries a non-empty extracted map and combined
/// string for both analysis and QnA. Zero personas count as incomplete by
/// convention: replaying an empty form would skip the only call that could
/// produce anything.
pub fn results_complete(registry: &PersonaRegistry) -> bool {
    !registry.is_empty() && registry.all_results_present()
}

enum Plan {
    Replay(AnalysisResults),
    Submit(AnalysisRequest),
}

/// Drives one analysis run against a shared [`WorkbenchState`].
pub struct RunService {
    client: Arc<dyn AnalysisClient>,
    replay_delay: Duration,
}

impl RunService {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            client,
            replay_delay: REPLAY_DELAY,
        }
    }

    /// Overrides the replay delay (tests use zero).
    pub fn with_replay_delay(mut self, delay: Duration) -> Self {
        self.replay_delay = delay;
        self
    }

    /// Runs the analysis.
    ///
    /// Rejected outright when a run is already in flight or no file has
    /// been staged. Otherwise the panel closes, the busy flag goes up, and
    /// the run either replays complete results after a fixed delay or
    /// submits the full state through the client. The busy flag is cleared
    /// on success, failure, and replay alike; a response is applied
    /// wholesale or not at all.
    pub async fn run(&self, state: &RwLock<WorkbenchState>) -> Result<AnalysisResults> {
        let plan = {
            let mut guard = state.write().await;
            if guard.busy {
                return Err(PulseError::RunInProgress);
            }
            let upload = guard
                .upload
                .clone()
                .ok_or_else(|| PulseError::validation("Select a presentation file first"))?;
            guard.close_panel();
            guard.busy = true;

            if results_complete(&guard.registry) {
                info!("All personas carry results; replaying without submission");
                Plan::Replay(AnalysisResults {
                    ppt: PresentationDetails {
                        ppt_id: None,
                        ppt_name: upload.file_name.clone(),
                        ppt_file: upload.file_name.clone(),
                        ppt_title: guard.presentation.title.clone(),
                        ppt_description: guard.presentation.description.clone(),
                        ppt_intent: guard.presentation.intent.clone(),
                        ppt_content: Map::new(),
                    },
                    personas: guard.registry.records(),
                })
            } else {
                info!(personas = guard.registry.len(), "Submitting analysis run");
                Plan::Submit(AnalysisRequest {
                    ppt_name: upload.file_name.clone(),
                    ppt_file: Some(upload.path.clone()),
                    ppt_title: guard.presentation.title.clone(),
                    ppt_description: guard.presentation.description.clone(),
                    ppt_intent: guard.presentation.intent.clone(),
                    personas: guard.registry.records(),
                })
            }
        };

        let outcome = match plan {
            Plan::Replay(results) => {
                tokio::time::sleep(self.replay_delay).await;
                Ok(results)
            }
            Plan::Submit(request) => self.client.analyze(request).await,
        };

        let mut guard = state.write().await;
        guard.busy = false;
        let results = outcome?;
        guard.registry.apply_results(&results.personas);
        guard.results = Some(results.clone());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::UploadKind;
    use crate::state::StagedUpload;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn staged_deck() -> StagedUpload {
        StagedUpload {
            file_name: "deck.pptx".to_string(),
            kind: UploadKind::Presentation,
            path: PathBuf::from("/tmp/deck.pptx"),
            summary: None,
        }
    }

    fn complete_record() -> PersonaRecord {
        let mut record = PersonaRecord::new();
        record
            .analysis
            .extracted_result
            .insert("k".to_string(), serde_json::json!("v"));
        record.analysis.combined_result = "analysis".to_string();
        record
            .qna
            .extracted_result
            .insert("k".to_string(), serde_json::json!("v"));
        record.qna.combined_result = "qna".to_string();
        record
    }

    fn canned_results(personas: Vec<PersonaRecord>) -> AnalysisResults {
        AnalysisResults {
            ppt: PresentationDetails::default(),
            personas,
        }
    }

    /// Client that counts calls and returns a fixed outcome.
    struct StubClient {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubClient {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait::async_trait]
    impl AnalysisClient for StubClient {
        async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResults> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PulseError::analysis("endpoint unreachable"));
            }
            Ok(canned_results(
                request.personas.iter().map(|_| complete_record()).collect(),
            ))
        }
    }

    /// Client that blocks until released, to hold a run in flight.
    struct BlockingClient {
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl AnalysisClient for BlockingClient {
        async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResults> {
            self.release.notified().await;
            Ok(canned_results(
                request.personas.iter().map(|_| complete_record()).collect(),
            ))
        }
    }

    fn state_with(personas: usize, staged: bool) -> Arc<RwLock<WorkbenchState>> {
        let mut state = WorkbenchState::new();
        for _ in 0..personas {
            state.add_persona();
        }
        if staged {
            state.stage_upload(staged_deck());
        }
        Arc::new(RwLock::new(state))
    }

    #[tokio::test]
    async fn test_run_without_upload_is_rejected() {
        let client = StubClient::new(false);
        let service = RunService::new(client.clone());
        let state = state_with(1, false);

        let err = service.run(&state).await.unwrap_err();
        assert!(matches!(err, PulseError::Validation(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert!(!state.read().await.busy);
    }

    #[tokio::test]
    async fn test_incomplete_registry_submits_and_applies_results() {
        let client = StubClient::new(false);
        let service = RunService::new(client.clone());
        let state = state_with(2, true);
        state.write().await.open_panel("0");

        let results = service.run(&state).await.unwrap();
        assert_eq!(results.personas.len(), 2);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        let guard = state.read().await;
        assert!(!guard.busy);
        // The panel closed before submission.
        assert_eq!(guard.panel.selection(), None);
        // The response was applied back onto the registry.
        assert!(guard.registry.all_results_present());
        assert!(guard.results.is_some());
    }

    #[tokio::test]
    async fn test_complete_registry_replays_without_calling_client() {
        let client = StubClient::new(false);
        let service =
            RunService::new(client.clone()).with_replay_delay(Duration::from_millis(0));

        let mut state = WorkbenchState::new();
        state.registry.rebuild_from(vec![complete_record()]);
        state.stage_upload(staged_deck());
        state.presentation.title = "Launch".to_string();
        let state = Arc::new(RwLock::new(state));

        let results = service.run(&state).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert_eq!(results.ppt.ppt_name, "deck.pptx");
        assert_eq!(results.ppt.ppt_title, "Launch");
        assert!(!state.read().await.busy);
    }

    #[tokio::test]
    async fn test_empty_registry_counts_as_incomplete() {
        assert!(!results_complete(&PersonaRegistry::new()));

        // An empty form still submits instead of replaying.
        let client = StubClient::new(false);
        let service = RunService::new(client.clone());
        let state = state_with(0, true);
        service.run(&state).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_clears_busy_and_keeps_state() {
        let client = StubClient::new(true);
        let service = RunService::new(client);
        let state = state_with(1, true);

        let err = service.run(&state).await.unwrap_err();
        assert!(matches!(err, PulseError::Analysis(_)));

        let guard = state.read().await;
        assert!(!guard.busy);
        assert!(guard.results.is_none());
        assert!(!guard.registry.all_results_present());
    }

    #[tokio::test]
    async fn test_second_run_while_in_flight_is_rejected() {
        let release = Arc::new(Notify::new());
        let client = Arc::new(BlockingClient {
            release: release.clone(),
        });
        let service = Arc::new(RunService::new(client));
        let state = state_with(1, true);

        let first = tokio::spawn({
            let service = service.clone();
            let state = state.clone();
            async move { service.run(&state).await }
        });

        // Wait until the first run has raised the busy flag.
        loop {
            if state.read().await.busy {
                break;
            }
            tokio::task::yield_now().await;
        }

        let err = service.run(&state).await.unwrap_err();
        assert!(matches!(err, PulseError::RunInProgress));

        release.notify_one();
        first.await.unwrap().unwrap();
        assert!(!state.read().await.busy);
    }
}
