use std::sync::Arc;

use crate::generation::ResumeGenerator;
use crate::store::StoreClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreClient,
    /// Pluggable generator. Default: `LlmResumeGenerator`.
    pub generator: Arc<dyn ResumeGenerator>,
    /// Container the resume routes read and write.
    pub container: String,
}
