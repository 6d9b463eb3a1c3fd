//! Evaluation data model shared by every evaluator backend.
//!
//! Wire names are camelCase, both for the model's JSON reply and for the HTTP
//! response. All scores are integers on a 0–100 scale.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::extractor::ResponseShape;

/// Upper bound of every score, candidate and interviewer alike.
pub const MAX_SCORE: u32 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

/// Seniority level the candidate is being assessed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("seniority must be 'junior', 'mid', or 'senior' (got '{0}')")]
pub struct InvalidSeniority(pub String);

impl FromStr for Seniority {
    type Err = InvalidSeniority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(Seniority::Junior),
            "mid" => Ok(Seniority::Mid),
            "senior" => Ok(Seniority::Senior),
            _ => Err(InvalidSeniority(s.to_string())),
        }
    }
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical hiring recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StrongHire,
    Hire,
    Borderline,
    Reject,
}

/// Likelihood that the interviewer's conduct introduced bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasRisk {
    Low,
    Medium,
    High,
}

// ────────────────────────────────────────────────────────────────────────────
// Inbound request
// ────────────────────────────────────────────────────────────────────────────

/// An already-validated evaluation request. Text fields are non-blank and the
/// seniority has been normalised by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub job_description: String,
    pub interview_transcript: String,
    pub seniority: Seniority,
    pub include_interviewer_evaluation: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Result records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub name: String,
    pub score: u32,
    pub evidence: String,
}

impl SkillAssessment {
    pub fn new(name: &str, score: u32, evidence: &str) -> Self {
        Self {
            name: name.to_string(),
            score,
            evidence: evidence.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvaluation {
    pub overall_score: u32,
    pub technical_score: u32,
    pub communication_score: u32,
    pub problem_solving_score: u32,
    pub verdict: Verdict,
    pub skills: Vec<SkillAssessment>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub risk_areas: Vec<String>,
    pub seniority_alignment: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewerEvaluation {
    pub overall_score: u32,
    pub question_quality: u32,
    pub communication_clarity: u32,
    pub bias_risk: BiasRisk,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub summary: String,
}

/// Final output of one evaluation. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub candidate_evaluation: CandidateEvaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interviewer_evaluation: Option<InterviewerEvaluation>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationResult {
    /// Stamps the result with the current time.
    pub fn new(
        candidate_evaluation: CandidateEvaluation,
        interviewer_evaluation: Option<InterviewerEvaluation>,
    ) -> Self {
        Self {
            candidate_evaluation,
            interviewer_evaluation,
            evaluated_at: Utc::now(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parse-boundary validation
// ────────────────────────────────────────────────────────────────────────────

fn check_score(field: &str, value: u32) -> Result<(), String> {
    if value > MAX_SCORE {
        return Err(format!(
            "{field} must be between 0 and {MAX_SCORE}, got {value}"
        ));
    }
    Ok(())
}

impl ResponseShape for CandidateEvaluation {
    const NAME: &'static str = "candidate evaluation";

    fn validate(&self) -> Result<(), String> {
        check_score("overallScore", self.overall_score)?;
        check_score("technicalScore", self.technical_score)?;
        check_score("communicationScore", self.communication_score)?;
        check_score("problemSolvingScore", self.problem_solving_score)?;
        for skill in &self.skills {
            check_score(&format!("skills[{}].score", skill.name), skill.score)?;
        }
        Ok(())
    }
}

impl ResponseShape for InterviewerEvaluation {
    const NAME: &'static str = "interviewer evaluation";

    fn validate(&self) -> Result<(), String> {
        check_score("overallScore", self.overall_score)?;
        check_score("questionQuality", self.question_quality)?;
        check_score("communicationClarity", self.communication_clarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_parses_case_insensitively() {
        assert_eq!("Senior".parse::<Seniority>().unwrap(), Seniority::Senior);
        assert_eq!(" MID ".parse::<Seniority>().unwrap(), Seniority::Mid);
        assert_eq!("junior".parse::<Seniority>().unwrap(), Seniority::Junior);
    }

    #[test]
    fn test_seniority_rejects_unknown_level() {
        let err = "staff".parse::<Seniority>().unwrap_err();
        assert_eq!(err, InvalidSeniority("staff".to_string()));
    }

    #[test]
    fn test_verdict_wire_values_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::StrongHire).unwrap(),
            r#""strong_hire""#
        );
        let verdict: Verdict = serde_json::from_str(r#""borderline""#).unwrap();
        assert_eq!(verdict, Verdict::Borderline);
    }

    #[test]
    fn test_result_omits_absent_interviewer_section() {
        let candidate = CandidateEvaluation {
            overall_score: 50,
            technical_score: 50,
            communication_score: 50,
            problem_solving_score: 50,
            verdict: Verdict::Borderline,
            skills: vec![],
            strengths: vec![],
            weaknesses: vec![],
            risk_areas: vec![],
            seniority_alignment: "n/a".to_string(),
            summary: "n/a".to_string(),
        };
        let value = serde_json::to_value(EvaluationResult::new(candidate, None)).unwrap();
        assert!(value.get("candidateEvaluation").is_some());
        assert!(value.get("evaluatedAt").is_some());
        assert!(value.get("interviewerEvaluation").is_none());
    }

    #[test]
    fn test_interviewer_validation_rejects_out_of_range_score() {
        let evaluation = InterviewerEvaluation {
            overall_score: 80,
            question_quality: 101,
            communication_clarity: 80,
            bias_risk: BiasRisk::Low,
            strengths: vec![],
            improvements: vec![],
            summary: String::new(),
        };
        let err = evaluation.validate().unwrap_err();
        assert!(err.contains("questionQuality"));
    }
}
