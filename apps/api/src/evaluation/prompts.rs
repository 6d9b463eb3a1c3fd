//! Evaluation prompt templates and the schema keys they request.
//!
//! Template and parser are two halves of one contract: the JSON schema written
//! into each template must list exactly the fields of the record the extractor
//! parses the reply into. `CANDIDATE_SCHEMA_KEYS` / `INTERVIEWER_SCHEMA_KEYS`
//! pin that down and the tests below fail if either side drifts.

use crate::evaluation::models::Seniority;
use crate::llm_client::prompts::{EVIDENCE_INSTRUCTION, JSON_ONLY_INSTRUCTION};

const JOB_DESCRIPTION: &str = "{JOB_DESCRIPTION}";
const INTERVIEW_TRANSCRIPT: &str = "{INTERVIEW_TRANSCRIPT}";
const SENIORITY_LEVEL: &str = "{SENIORITY_LEVEL}";
const JSON_ONLY: &str = "{JSON_ONLY_INSTRUCTION}";
const EVIDENCE: &str = "{EVIDENCE_INSTRUCTION}";

/// Top-level keys of `CandidateEvaluation` on the wire.
pub const CANDIDATE_SCHEMA_KEYS: &[&str] = &[
    "overallScore",
    "technicalScore",
    "communicationScore",
    "problemSolvingScore",
    "verdict",
    "skills",
    "strengths",
    "weaknesses",
    "riskAreas",
    "seniorityAlignment",
    "summary",
];

/// Keys of each `SkillAssessment` inside the candidate `skills` array.
pub const SKILL_SCHEMA_KEYS: &[&str] = &["name", "score", "evidence"];

/// Top-level keys of `InterviewerEvaluation` on the wire.
pub const INTERVIEWER_SCHEMA_KEYS: &[&str] = &[
    "overallScore",
    "questionQuality",
    "communicationClarity",
    "biasRisk",
    "strengths",
    "improvements",
    "summary",
];

/// Candidate evaluation template.
/// Placeholders: {JOB_DESCRIPTION}, {SENIORITY_LEVEL}, {INTERVIEW_TRANSCRIPT}.
pub const CANDIDATE_PROMPT_TEMPLATE: &str = r#"[SYSTEM ROLE]
You are a Senior Technical Architect and Hiring Committee Lead acting as a deterministic Interview Evaluation Engine. You analyze the inputs below and produce an objective, evidence-based assessment of the candidate's performance.

[CORE CONSTRAINTS]
{JSON_ONLY_INSTRUCTION}
{EVIDENCE_INSTRUCTION}

[EVALUATION CRITERIA]
1. Technical Depth: understanding of the core technologies named in the job description.
2. Performance Awareness: does the candidate consider complexity, memory and scalability?
3. Edge-Case Handling: does the candidate proactively mention failure modes?
4. Communication: clarity and structure of the candidate's explanations.
5. Seniority Alignment: does the demonstrated depth match the expected seniority level?

[INPUT DATA]
- JOB_DESCRIPTION: {JOB_DESCRIPTION}
- SENIORITY_EXPECTATION: {SENIORITY_LEVEL}
- INTERVIEW_TRANSCRIPT: {INTERVIEW_TRANSCRIPT}

[REQUIRED JSON SCHEMA]
{
  "overallScore": integer (0-100),
  "technicalScore": integer (0-100),
  "communicationScore": integer (0-100),
  "problemSolvingScore": integer (0-100),
  "verdict": "strong_hire" | "hire" | "borderline" | "reject",
  "skills": [
    {
      "name": "string",
      "score": integer (0-100),
      "evidence": "Short quote or specific reference from the transcript"
    }
  ],
  "strengths": ["string"],
  "weaknesses": ["string"],
  "riskAreas": ["string"],
  "seniorityAlignment": "Specific assessment of fit versus the expected level",
  "summary": "Two or three sentence overall assessment"
}

[EXECUTION]
Evaluate the candidate now and return the JSON object."#;

/// Interviewer evaluation template. Placeholders: {JOB_DESCRIPTION}, {INTERVIEW_TRANSCRIPT}.
pub const INTERVIEWER_PROMPT_TEMPLATE: &str = r#"[SYSTEM ROLE]
You are a Senior Talent Acquisition Lead and Interview Coach. Your purpose is to evaluate the QUALITY OF THE INTERVIEWER'S performance based on the interview transcript and job description below.

[CORE CONSTRAINTS]
{JSON_ONLY_INSTRUCTION}
- OBJECTIVE ANALYSIS. Focus on question depth, how the interviewer guided the candidate, professionalism and bias.
- Score only what the transcript shows; do not assume unseen parts of the interview.

[INPUT DATA]
- JOB_DESCRIPTION: {JOB_DESCRIPTION}
- INTERVIEW_TRANSCRIPT: {INTERVIEW_TRANSCRIPT}

[REQUIRED JSON SCHEMA]
{
  "overallScore": integer (0-100),
  "questionQuality": integer (0-100),
  "communicationClarity": integer (0-100),
  "biasRisk": "low" | "medium" | "high",
  "strengths": ["string"],
  "improvements": ["string"],
  "summary": "Concise summary of interviewer strengths and tactical suggestions for improvement"
}

[EXECUTION]
Evaluate the interviewer now and return the JSON object."#;

/// Builds the candidate prompt. `transcript` must already be sanitized.
pub fn build_candidate_prompt(
    job_description: &str,
    transcript: &str,
    seniority: Seniority,
) -> String {
    render(
        CANDIDATE_PROMPT_TEMPLATE,
        &[
            (JSON_ONLY, JSON_ONLY_INSTRUCTION),
            (EVIDENCE, EVIDENCE_INSTRUCTION),
            (JOB_DESCRIPTION, job_description),
            (SENIORITY_LEVEL, seniority.as_str()),
            (INTERVIEW_TRANSCRIPT, transcript),
        ],
    )
}

/// Builds the interviewer prompt. `transcript` must already be sanitized.
pub fn build_interviewer_prompt(job_description: &str, transcript: &str) -> String {
    render(
        INTERVIEWER_PROMPT_TEMPLATE,
        &[
            (JSON_ONLY, JSON_ONLY_INSTRUCTION),
            (JOB_DESCRIPTION, job_description),
            (INTERVIEW_TRANSCRIPT, transcript),
        ],
    )
}

/// Single-pass placeholder substitution. Substituted values are never
/// rescanned, so user text containing `{INTERVIEW_TRANSCRIPT}` stays literal.
fn render(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + slots.iter().map(|(_, value)| value.len()).sum::<usize>(),
    );
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match slots.iter().find(|(key, _)| candidate.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &candidate[key.len()..];
            }
            None => {
                out.push('{');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
