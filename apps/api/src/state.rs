use std::sync::Arc;

use crate::job_ad::pipeline::GenerationOptions;
use crate::job_ad::session::SessionStore;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Default: `LlmClient`.
    pub backend: Arc<dyn CompletionBackend>,
    pub sessions: SessionStore,
    pub generation: GenerationOptions,
}
