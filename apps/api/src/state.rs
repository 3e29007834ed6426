use std::sync::Arc;

use crate::analysis::{ResumeAnalyzer, SimulatedAnalyzer};
use crate::config::Config;
use crate::history::HistoryStore;
use crate::upload::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Candidate history shared by the candidate and HR surfaces.
    pub history: HistoryStore,
    pub sessions: SessionRegistry,
    /// Pluggable analyzer. Default: SimulatedAnalyzer with the configured delay.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let analyzer = Arc::new(SimulatedAnalyzer {
            delay: config.analysis_delay,
        });
        Self {
            history: HistoryStore::new(),
            sessions: SessionRegistry::new(),
            analyzer,
            config,
        }
    }
}
