// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every prompt that expects a machine-readable answer.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    IMPORTANT: Return ONLY the JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include notes, explanations or apologies.";
