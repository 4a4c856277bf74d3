//! Application state shared across handlers.

use std::collections::HashSet;
use std::sync::Arc;

use turing_agent::Provider;
use turing_orchestrator::Orchestrator;

use crate::config::ApiConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub orchestrator: Arc<Orchestrator>,
    /// Providers with a configured API key.
    pub available_providers: Arc<HashSet<Provider>>,
}

impl AppState {
    pub fn new(config: ApiConfig, orchestrator: Orchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            available_providers: Arc::new(HashSet::new()),
        }
    }

    pub fn with_available_providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        self.available_providers = Arc::new(providers.into_iter().collect());
        self
    }

    pub fn is_available(&self, provider: Provider) -> bool {
        self.available_providers.contains(&provider)
    }
}
