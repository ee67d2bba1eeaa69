//! HTTP server for the Pulse workbench.
//!
//! One [`WorkbenchState`] lives behind the router and is exposed through a
//! small REST surface; the embedded page at `/` is a thin render binding
//! over that API. The scaffolding analysis endpoint (`POST /run_analysis`)
//! and the legacy `POST /update_presentation_info` path are served from the
//! same router.

pub mod analysis;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use pulse_core::run::RunService;
use pulse_core::state::WorkbenchState;
use pulse_core::Result;

/// Upload size cap: 16 MiB, enforced on the whole request body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared application context passed to all handlers.
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<RwLock<WorkbenchState>>,
    pub runner: Arc<RunService>,
    /// Directory holding staged uploads; removed when the server exits.
    pub staging: Arc<TempDir>,
    pub upload_limit: usize,
}

impl AppContext {
    /// Creates a fresh context with empty state and its own staging
    /// directory.
    pub fn new(runner: RunService) -> Result<Self> {
        Ok(Self {
            state: Arc::new(RwLock::new(WorkbenchState::new())),
            runner: Arc::new(runner),
            staging: Arc::new(TempDir::new()?),
            upload_limit: MAX_UPLOAD_BYTES,
        })
    }
}

/// Builds the router with all routes attached.
pub fn build_router(ctx: AppContext) -> Router {
    let upload_limit = ctx.upload_limit;

    Router::new()
        // Workbench UI (render binding over the API below)
        .route("/", get(index))
        // Health endpoint
        .route("/health", get(handlers::health))
        // Workbench state surface
        .route("/api/state", get(handlers::get_state))
        .route("/api/personas", post(handlers::add_persona))
        .route(
            "/api/personas/{key}",
            axum::routing::patch(handlers::update_persona).delete(handlers::remove_persona),
        )
        .route("/api/personas/{key}/prompt", post(handlers::update_prompt))
        .route("/api/panel/open", post(handlers::open_panel))
        .route("/api/panel/close", post(handlers::close_panel))
        .route("/api/presentation", post(handlers::update_presentation))
        .route("/api/upload", post(handlers::upload))
        .route("/api/run", post(handlers::run))
        // Analysis collaborator (scaffolding) and legacy path
        .route("/run_analysis", post(analysis::run_analysis))
        .route(
            "/update_presentation_info",
            post(analysis::update_presentation_info),
        )
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("ui.html"))
}
