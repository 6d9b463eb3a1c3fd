//! Deterministic evaluator: fixed, seniority-keyed records, no network.
//!
//! Active when `AI_ENABLED=false`. Same input always yields the same records,
//! which makes it the backend for wiring tests and demos.

use async_trait::async_trait;
use tracing::info;

use crate::evaluation::models::{
    BiasRisk, CandidateEvaluation, EvaluationRequest, EvaluationResult, InterviewerEvaluation,
    Seniority, SkillAssessment, Verdict,
};
use crate::evaluation::{EvaluationError, Evaluator};

#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicEvaluator;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl DeterministicEvaluator {
    /// The fixed candidate record for `seniority`.
    pub fn candidate_evaluation(seniority: Seniority) -> CandidateEvaluation {
        match seniority {
            Seniority::Junior => CandidateEvaluation {
                overall_score: 62,
                technical_score: 55,
                communication_score: 75,
                problem_solving_score: 50,
                verdict: Verdict::Borderline,
                skills: vec![
                    SkillAssessment::new("JavaScript", 70, "Solid fundamentals, good DOM manipulation"),
                    SkillAssessment::new("React", 60, "Basic component knowledge"),
                    SkillAssessment::new("REST APIs", 50, "Limited production experience"),
                ],
                strengths: strings(&[
                    "Quick learner",
                    "Good communication skills",
                    "Demonstrates curiosity about technologies",
                ]),
                weaknesses: strings(&[
                    "Limited production experience",
                    "Needs mentoring on best practices",
                    "Database design knowledge is basic",
                ]),
                risk_areas: strings(&[
                    "No production deployment experience",
                    "Weak SQL knowledge",
                ]),
                seniority_alignment: "Shows promise but currently fits an entry-level role better \
                    than Junior (requires heavy mentorship)."
                    .to_string(),
                summary: "Promising junior engineer with solid fundamentals. Would benefit from \
                    mentorship on production systems and architectural patterns."
                    .to_string(),
            },
            Seniority::Mid => CandidateEvaluation {
                overall_score: 75,
                technical_score: 78,
                communication_score: 80,
                problem_solving_score: 70,
                verdict: Verdict::Hire,
                skills: vec![
                    SkillAssessment::new("Java", 80, "Strong OOP principles and design patterns"),
                    SkillAssessment::new("Spring Boot", 80, "Production experience with microservices"),
                    SkillAssessment::new("SQL", 70, "Good database design and optimization"),
                    SkillAssessment::new("System Design", 60, "Can architect medium-scale systems"),
                ],
                strengths: strings(&[
                    "Strong technical depth",
                    "Good problem-solving approach",
                    "Effective team communication",
                    "Production experience",
                ]),
                weaknesses: strings(&[
                    "Limited large-scale system experience",
                    "Could improve on distributed systems concepts",
                ]),
                risk_areas: strings(&["Limited experience with high-traffic systems"]),
                seniority_alignment: "Strongly aligns with Mid-level expectations. Ready for \
                    Senior-level responsibilities within 12-18 months."
                    .to_string(),
                summary: "Well-rounded mid-level engineer ready for senior responsibilities. Strong \
                    technical skills and proven ability to deliver production systems."
                    .to_string(),
            },
            Seniority::Senior => CandidateEvaluation {
                overall_score: 85,
                technical_score: 90,
                communication_score: 90,
                problem_solving_score: 90,
                verdict: Verdict::StrongHire,
                skills: vec![
                    SkillAssessment::new("System Architecture", 90, "Excellent design of scalable systems"),
                    SkillAssessment::new("Leadership", 80, "Mentors junior engineers effectively"),
                    SkillAssessment::new("Cloud Infrastructure", 90, "Extensive AWS/GCP experience"),
                    SkillAssessment::new(
                        "Technical Decision-Making",
                        80,
                        "Makes well-informed architectural choices",
                    ),
                ],
                strengths: strings(&[
                    "Exceptional technical depth",
                    "Strong leadership and mentoring skills",
                    "Excellent communication with stakeholders",
                    "Proven track record with large-scale systems",
                    "Clear technical vision",
                ]),
                weaknesses: strings(&["None apparent from interview"]),
                risk_areas: strings(&["None identified"]),
                seniority_alignment: "Exceptional Senior candidate. Demonstrates leadership \
                    qualities found in Staff/Principal engineers."
                    .to_string(),
                summary: "Exceptional senior engineer with deep technical expertise and leadership \
                    qualities. Ready for principal engineer or architect roles. Strong hire."
                    .to_string(),
            },
        }
    }

    /// The fixed interviewer record (0–100 scale, like every other score).
    pub fn interviewer_evaluation() -> InterviewerEvaluation {
        InterviewerEvaluation {
            overall_score: 80,
            question_quality: 80,
            communication_clarity: 80,
            bias_risk: BiasRisk::Low,
            strengths: strings(&[
                "Asked relevant technical questions",
                "Good mix of behavioral and technical probes",
                "Clear communication of expectations",
            ]),
            improvements: strings(&[
                "Could probe deeper on system design",
                "Follow-up questions could be more specific",
            ]),
            summary: "Interviewer conducted a well-structured interview with appropriate depth \
                for the role level."
                .to_string(),
        }
    }
}

#[async_trait]
impl Evaluator for DeterministicEvaluator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        info!(
            "Deterministic evaluation (seniority={}, evaluate_interviewer={})",
            request.seniority, request.include_interviewer_evaluation
        );

        let candidate = Self::candidate_evaluation(request.seniority);
        let interviewer = request
            .include_interviewer_evaluation
            .then(Self::interviewer_evaluation);

        Ok(EvaluationResult::new(candidate, interviewer))
    }

    fn backend(&self) -> &'static str {
        "deterministic"
    }
}
