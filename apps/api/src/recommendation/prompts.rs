// Prompts for the LLM query enricher.

pub const QUERY_EXPANSION_SYSTEM: &str = "You are an expert in pre-employment assessment. \
    You rewrite hiring requests into search text for an assessment catalog. \
    You MUST respond with valid JSON only. Do NOT use markdown code fences.";

pub const QUERY_EXPANSION_PROMPT_TEMPLATE: &str = r#"Rewrite the hiring request below as a short search text for an assessment catalog.

Keep every skill, role and trait the request names. Add closely related skills and
assessment terms that a recruiter would search for. Do not invent requirements that
contradict the request. Keep it under 60 words, in English.

Return JSON with exactly this shape:
{"expanded_query": "<search text>"}

Hiring request:
{query}"#;
