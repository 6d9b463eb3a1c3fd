// Evaluation dispatch: sanitize → prompt → LLM → extract, or the deterministic
// stand-in when the LLM integration is disabled.
// All model calls go through llm_client; no provider HTTP here.

pub mod deterministic;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod sanitizer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{AiProvider, Config};
use crate::evaluation::deterministic::DeterministicEvaluator;
use crate::evaluation::extractor::ParseError;
use crate::evaluation::models::{EvaluationRequest, EvaluationResult};
use crate::evaluation::orchestrator::LlmEvaluator;
use crate::llm_client::{LlmClient, LlmError, RemoteLlmClient, StaticLlmClient};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("evaluation exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
}

/// An evaluation backend. Carried in `AppState` as `Arc<dyn Evaluator>` and
/// chosen once at startup by `build_evaluator`.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError>;

    /// "deterministic" or "llm", reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Selects the evaluator for this process from configuration.
pub fn build_evaluator(config: &Config) -> anyhow::Result<Arc<dyn Evaluator>> {
    if !config.ai.enabled {
        info!("AI evaluation disabled; using deterministic evaluator");
        return Ok(Arc::new(DeterministicEvaluator));
    }

    let llm: Arc<dyn LlmClient> = match config.ai.provider {
        AiProvider::Gemini => {
            if config.ai.api_keys.is_empty() {
                tracing::warn!("AI_API_KEYS is empty; every evaluation will fail until keys are configured");
            }
            Arc::new(RemoteLlmClient::new(config.ai.remote_settings())?)
        }
        AiProvider::Static => Arc::new(StaticLlmClient),
    };

    info!(
        "AI evaluation enabled (provider: {}, model: {}, keys: {})",
        llm.name(),
        config.ai.model,
        config.ai.api_keys.len()
    );

    Ok(Arc::new(LlmEvaluator::new(llm, config.evaluation_timeout)))
}
