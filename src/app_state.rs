// =============================================================================
// Shared application state
// =============================================================================
//
// All state is request-local apart from the hot-reloadable runtime config and
// the two outbound clients. Analyses are never cached across requests.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;

use crate::advisory::AdvisoryClient;
use crate::market_data::YahooClient;
use crate::runtime_config::RuntimeConfig;

pub struct AppState {
    pub runtime_config: RwLock<RuntimeConfig>,
    pub market: YahooClient,
    pub advisory: AdvisoryClient,
    pub started_at: Instant,
    analyses_run: AtomicU64,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        let advisory =
            AdvisoryClient::new(api_key, config.advisory_model.clone(), config.advisory_max_tokens);

        Self {
            runtime_config: RwLock::new(config),
            market: YahooClient::new(),
            advisory,
            started_at: Instant::now(),
            analyses_run: AtomicU64::new(0),
        }
    }

    /// Count a completed analysis (exposed by the health endpoint).
    pub fn record_analysis(&self) -> u64 {
        self.analyses_run.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn analyses_run(&self) -> u64 {
        self.analyses_run.load(Ordering::Relaxed)
    }
}
