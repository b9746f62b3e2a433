use std::sync::Arc;

use crate::config::Config;
use crate::ingest::IngestLimits;
use crate::llm_client::TextModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Model backend. `LlmClient` in production, a stub in tests.
    pub model: Arc<dyn TextModel>,
    pub limits: IngestLimits,
}

impl AppState {
    pub fn new(config: Config, model: Arc<dyn TextModel>) -> Self {
        let limits = IngestLimits::from_config(&config);
        Self {
            config,
            model,
            limits,
        }
    }
}
