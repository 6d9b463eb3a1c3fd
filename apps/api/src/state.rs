use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Deterministic or LLM-backed, selected once at startup via `AI_ENABLED`.
    pub evaluator: Arc<dyn Evaluator>,
    pub config: Config,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(evaluator: Arc<dyn Evaluator>, config: Config) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_interval));
        Self {
            evaluator,
            config,
            rate_limiter,
        }
    }
}
