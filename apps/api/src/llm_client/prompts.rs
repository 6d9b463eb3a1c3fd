// Cross-cutting prompt fragments shared by every evaluation template.
// Templates themselves live in evaluation::prompts alongside the schema keys.

/// Output-format constraint embedded in every template.
pub const JSON_ONLY_INSTRUCTION: &str = "\
- NO CONVERSATION. Do not greet, do not explain your reasoning outside the JSON, \
and do not ask follow-up questions.
- STRICT JSON. Output must be a single raw JSON object matching the schema below. \
Do NOT wrap it in markdown code fences. Do NOT add any text before or after it.";

/// Grounding constraint: only transcript evidence may earn credit.
pub const EVIDENCE_INSTRUCTION: &str = "\
- EVIDENCE-ONLY. Do not credit skills that are not explicitly demonstrated in the transcript.
- If a skill is listed in the job description but not discussed in the transcript, \
leave it out of the 'skills' array.
- If a solution works but is suboptimal, penalize technicalScore and problemSolvingScore \
rather than overallScore or the verdict.";
