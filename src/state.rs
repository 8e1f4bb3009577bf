use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::PgStore;
use crate::middleware::rate_limit::RateLimiter;
use crate::store::ExerciseStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExerciseStore>,
    pub config: Arc<AppConfig>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = PgStore::connect_lazy(&config)?;
        // Already logged; requests will surface the outage as 500s.
        let _ = store.migrate().await;

        Ok(Self::from_parts(Arc::new(store), config))
    }

    pub fn from_parts(store: Arc<dyn ExerciseStore>, config: Arc<AppConfig>) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window,
        ));
        Self {
            store,
            config,
            limiter,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::with_store(Arc::new(crate::test_support::MemoryStore::default()))
    }

    #[cfg(test)]
    pub fn with_store(store: Arc<dyn ExerciseStore>) -> Self {
        Self::from_parts(store, Arc::new(crate::test_support::test_config()))
    }
}
