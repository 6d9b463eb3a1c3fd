//! Offline stub client: fixed reply, simulated latency, zero network calls.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::{LlmClient, LlmError};

const SIMULATED_LATENCY: Duration = Duration::from_millis(100);

/// One document that satisfies both the candidate and the interviewer schema,
/// so a full evaluation runs end to end against this client.
pub const STATIC_RESPONSE: &str = r#"{
  "overallScore": 75,
  "technicalScore": 72,
  "communicationScore": 80,
  "problemSolvingScore": 70,
  "verdict": "hire",
  "skills": [
    { "name": "TypeScript", "score": 85, "evidence": "Walked through generic constraints on a repository type" },
    { "name": "Node.js", "score": 72, "evidence": "Explained event-loop blocking with a CPU-bound example" },
    { "name": "System Design", "score": 68, "evidence": "Proposed a queue between ingestion and processing" }
  ],
  "strengths": [
    "Strong problem-solving approach",
    "Clear communication of technical concepts"
  ],
  "weaknesses": [
    "Limited experience with distributed systems",
    "Could improve on algorithmic optimization"
  ],
  "riskAreas": [
    "Lack of hands-on DevOps experience"
  ],
  "seniorityAlignment": "Aligns with mid-level expectations; slightly below senior depth on system design.",
  "summary": "Solid engineer with strong fundamentals and clear communication.",
  "questionQuality": 78,
  "communicationClarity": 82,
  "biasRisk": "low",
  "improvements": [
    "Probe deeper on failure handling",
    "Ask more specific follow-up questions"
  ]
}"#;

/// Returns `STATIC_RESPONSE` for every prompt. Never fails.
#[derive(Debug, Clone, Default)]
pub struct StaticLlmClient;

#[async_trait]
impl LlmClient for StaticLlmClient {
    async fn send(&self, prompt: &str) -> Result<String, LlmError> {
        info!(
            prompt_chars = prompt.len(),
            "Static LLM client: returning canned response (no API call)"
        );
        tokio::time::sleep(SIMULATED_LATENCY).await;
        Ok(STATIC_RESPONSE.to_string())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
