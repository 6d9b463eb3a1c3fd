/// LLM Client — the single point of entry for all model calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Evaluators hold an `Arc<dyn LlmClient>` chosen once at startup; swapping
/// the remote provider for the static stub never touches call sites.
use async_trait::async_trait;
use thiserror::Error;

pub mod fixed;
pub mod prompts;
pub mod remote;

pub use fixed::StaticLlmClient;
pub use remote::{RemoteLlmClient, RemoteLlmSettings};

#[derive(Debug, Error)]
pub enum LlmError {
    /// No usable credentials. Never retried.
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    /// Rate limiting or momentary provider outage. Retried inside the client.
    #[error("transient provider error (status {status:?}): {message}")]
    Transient { status: Option<u16>, message: String },

    /// Anything retrying cannot fix, including a malformed response envelope.
    #[error("fatal provider error (status {status:?}): {message}")]
    Fatal { status: Option<u16>, message: String },
}

impl LlmError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transient { .. })
    }
}

/// Sends one prompt to a model and returns its raw text reply.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}
