use crate::config::Config;
use crate::fetcher::{FetchError, HttpFetcher, PageFetcher};
use crate::runner::Runner;
use crate::store::{History, ResultStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<Runner>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config.user_agent())?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    /// State around any fetcher; tests pass their own.
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Self {
        let runner = Runner::new(
            fetcher,
            ResultStore::new(config.result_ttl_secs()),
            History::new(config.history_limit()),
            config.timeout_secs(),
        );
        Self {
            runner: Arc::new(runner),
        }
    }
}
