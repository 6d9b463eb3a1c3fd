//! LLM-backed evaluator. Drives sanitize → prompt → send → extract.
//!
//! Flow per request (one pass, no retries at this layer):
//!   1. sanitize transcript
//!   2. candidate prompt → LLM → CandidateEvaluation   (mandatory)
//!   3. interviewer prompt → LLM → InterviewerEvaluation (if requested)
//!   4. assemble EvaluationResult
//!
//! Steps 2 and 3 run concurrently and are joined fail-fast: the first error
//! drops the other future, cancelling its in-flight provider call. There is
//! no partial success. The whole request is bounded by `deadline`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::evaluation::extractor::{self, ResponseShape};
use crate::evaluation::models::{
    CandidateEvaluation, EvaluationRequest, EvaluationResult, InterviewerEvaluation,
};
use crate::evaluation::prompts::{build_candidate_prompt, build_interviewer_prompt};
use crate::evaluation::sanitizer::sanitize;
use crate::evaluation::{EvaluationError, Evaluator};
use crate::llm_client::LlmClient;

pub struct LlmEvaluator {
    llm: Arc<dyn LlmClient>,
    deadline: Duration,
}

impl LlmEvaluator {
    pub fn new(llm: Arc<dyn LlmClient>, deadline: Duration) -> Self {
        Self { llm, deadline }
    }

    async fn run(&self, request: &EvaluationRequest) -> Result<EvaluationResult, EvaluationError> {
        let transcript = sanitize(&request.interview_transcript);

        let candidate = self.dispatch::<CandidateEvaluation>(build_candidate_prompt(
            &request.job_description,
            &transcript,
            request.seniority,
        ));

        if !request.include_interviewer_evaluation {
            return Ok(EvaluationResult::new(candidate.await?, None));
        }

        let interviewer = self.dispatch::<InterviewerEvaluation>(build_interviewer_prompt(
            &request.job_description,
            &transcript,
        ));

        let (candidate, interviewer) = tokio::try_join!(candidate, interviewer)?;
        Ok(EvaluationResult::new(candidate, Some(interviewer)))
    }

    /// Sends one prompt and parses the reply into `T`.
    async fn dispatch<T: ResponseShape>(&self, prompt: String) -> Result<T, EvaluationError> {
        info!(
            prompt_chars = prompt.len(),
            "Dispatching {} prompt to {}",
            T::NAME,
            self.llm.name()
        );

        let raw = self.llm.send(&prompt).await?;

        extractor::parse::<T>(&raw).map_err(|e| {
            error!(raw_response = %e.raw, "Failed to parse {}: {}", T::NAME, e.message);
            EvaluationError::from(e)
        })
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        let span = info_span!(
            "evaluation",
            evaluation_id = %Uuid::new_v4(),
            seniority = %request.seniority,
            evaluate_interviewer = request.include_interviewer_evaluation,
        );

        async {
            let result = match tokio::time::timeout(self.deadline, self.run(request)).await {
                Ok(result) => result,
                Err(_) => Err(EvaluationError::DeadlineExceeded(self.deadline)),
            };

            match &result {
                Ok(r) => info!(
                    "Evaluation complete: overall={} verdict={:?}",
                    r.candidate_evaluation.overall_score, r.candidate_evaluation.verdict
                ),
                Err(e) => error!("Evaluation failed: {e}"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}
