//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::models::{
    CandidateEvaluation, EvaluationRequest, EvaluationResult, InvalidSeniority, Seniority,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvaluationRequest {
    pub job_description: String,
    pub interview_transcript: String,
    pub seniority: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullEvaluationRequest {
    pub job_description: String,
    pub interview_transcript: String,
    pub seniority: String,
    #[serde(default)]
    pub evaluate_interviewer: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvaluationResponse {
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(flatten)]
    pub evaluation: CandidateEvaluation,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FullEvaluationResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluate
///
/// Candidate-only evaluation.
pub async fn handle_evaluate_candidate(
    State(state): State<AppState>,
    payload: Result<Json<CandidateEvaluationRequest>, JsonRejection>,
) -> Result<Json<CandidateEvaluationResponse>, AppError> {
    info!("Received candidate evaluation request");
    check_rate_limit(&state)?;

    let Json(body) = payload.map_err(reject_body)?;
    let request = validate(
        body.job_description,
        body.interview_transcript,
        &body.seniority,
        false,
    )?;

    let result = state.evaluator.evaluate(&request).await?;

    Ok(Json(CandidateEvaluationResponse {
        status: "success",
        kind: "candidate",
        evaluation: result.candidate_evaluation,
        evaluated_at: result.evaluated_at,
    }))
}

/// POST /api/v1/evaluate/full
///
/// Candidate evaluation plus, when `evaluateInterviewer` is true, an
/// assessment of the interviewer. Either both sections succeed or the request fails.
pub async fn handle_evaluate_full(
    State(state): State<AppState>,
    payload: Result<Json<FullEvaluationRequest>, JsonRejection>,
) -> Result<Json<FullEvaluationResponse>, AppError> {
    info!("Received full evaluation request");
    check_rate_limit(&state)?;

    let Json(body) = payload.map_err(reject_body)?;
    let request = validate(
        body.job_description,
        body.interview_transcript,
        &body.seniority,
        body.evaluate_interviewer,
    )?;

    let result = state.evaluator.evaluate(&request).await?;

    Ok(Json(FullEvaluationResponse {
        status: "success",
        result,
    }))
}

fn check_rate_limit(state: &AppState) -> Result<(), AppError> {
    if state.rate_limiter.try_acquire() {
        Ok(())
    } else {
        Err(AppError::RateLimited)
    }
}

fn reject_body(rejection: JsonRejection) -> AppError {
    tracing::debug!("Rejected request body: {rejection}");
    AppError::Validation("Invalid JSON format or missing required fields".to_string())
}

/// Turns raw body fields into a validated `EvaluationRequest`.
fn validate(
    job_description: String,
    interview_transcript: String,
    seniority: &str,
    include_interviewer_evaluation: bool,
) -> Result<EvaluationRequest, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation("jobDescription is required".to_string()));
    }
    if interview_transcript.trim().is_empty() {
        return Err(AppError::Validation(
            "interviewTranscript is required".to_string(),
        ));
    }
    if seniority.trim().is_empty() {
        return Err(AppError::Validation("seniority is required".to_string()));
    }
    let seniority: Seniority = seniority
        .parse()
        .map_err(|e: InvalidSeniority| AppError::Validation(e.to_string()))?;

    Ok(EvaluationRequest {
        job_description,
        interview_transcript,
        seniority,
        include_interviewer_evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_normalizes_seniority() {
        let request = validate("JD".into(), "transcript".into(), "SENIOR", true).unwrap();
        assert_eq!(request.seniority, Seniority::Senior);
        assert!(request.include_interviewer_evaluation);
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(matches!(
            validate("  ".into(), "t".into(), "mid", false),
            Err(AppError::Validation(msg)) if msg == "jobDescription is required"
        ));
        assert!(matches!(
            validate("jd".into(), "\n".into(), "mid", false),
            Err(AppError::Validation(msg)) if msg == "interviewTranscript is required"
        ));
        assert!(matches!(
            validate("jd".into(), "t".into(), "", false),
            Err(AppError::Validation(msg)) if msg == "seniority is required"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_seniority() {
        assert!(matches!(
            validate("jd".into(), "t".into(), "principal", false),
            Err(AppError::Validation(msg)) if msg.contains("'junior', 'mid', or 'senior'")
        ));
    }

    #[test]
    fn test_full_request_defaults_interviewer_flag_to_false() {
        let json = serde_json::json!({
            "jobDescription": "Backend Engineer",
            "interviewTranscript": "Q: ... A: ...",
            "seniority": "mid"
        });
        let request: FullEvaluationRequest = serde_json::from_value(json).unwrap();
        assert!(!request.evaluate_interviewer);
    }
}
