use std::sync::Arc;

use crate::config::Config;
use crate::generation::cost::Pricing;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Production: `OpenAiClient`.
    pub llm: Arc<dyn CompletionClient>,
    /// Token rates used for every cost estimate.
    pub pricing: Pricing,
    pub config: Config,
}
