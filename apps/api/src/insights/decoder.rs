//! Response decoder: turns the model's free-form text into a validated `InsightPayload`.
//!
//! The generation service only promises "text that should contain one JSON object".
//! Everything about getting from that text to a typed payload lives here:
//! 1. strip a markdown code fence if the model added one anyway
//! 2. cut to the outermost `{ ... }` if prose leaked around the object
//! 3. deserialize with serde (unknown enum values are rejected)
//! 4. validate cardinalities and salary-band ordering

use thiserror::Error;

use crate::models::insight::{InsightPayload, SalaryRange};

/// Minimum number of entries in each list of an insight.
pub const MIN_ENTRIES: usize = 5;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response contained no JSON object")]
    NoJson,

    #[error("response is not valid insight JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("insight payload failed validation: {0}")]
    Invalid(String),
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
///
/// Idempotent: a second pass returns its input unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Narrows `text` to its outermost JSON object.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Decodes and validates a raw model response.
pub fn decode_insight(raw: &str) -> Result<InsightPayload, DecodeError> {
    let text = extract_json_object(strip_code_fences(raw)).ok_or(DecodeError::NoJson)?;
    let payload: InsightPayload = serde_json::from_str(text)?;
    validate_payload(&payload)?;
    Ok(payload)
}

/// Checks the invariants every stored insight must hold.
pub fn validate_payload(payload: &InsightPayload) -> Result<(), DecodeError> {
    let mut problems = Vec::new();

    if payload.salary_ranges.len() < MIN_ENTRIES {
        problems.push(format!(
            "expected at least {MIN_ENTRIES} salary ranges, got {}",
            payload.salary_ranges.len()
        ));
    }
    for range in &payload.salary_ranges {
        if let Some(problem) = check_salary_range(range) {
            problems.push(problem);
        }
    }

    if !payload.growth_rate.is_finite() {
        problems.push("growth rate is not a finite number".to_string());
    }

    for (name, list) in [
        ("top skills", &payload.top_skills),
        ("key trends", &payload.key_trends),
        ("recommended skills", &payload.recommended_skills),
    ] {
        let usable = list.iter().filter(|s| !s.trim().is_empty()).count();
        if usable < MIN_ENTRIES {
            problems.push(format!(
                "expected at least {MIN_ENTRIES} {name}, got {usable}"
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::Invalid(problems.join("; ")))
    }
}

fn check_salary_range(range: &SalaryRange) -> Option<String> {
    if range.role.trim().is_empty() || range.location.trim().is_empty() {
        return Some("salary range with empty role or location".to_string());
    }
    let amounts = [range.min, range.median, range.max];
    if amounts.iter().any(|a| !a.is_finite() || *a < 0.0) {
        return Some(format!("{}: amounts must be non-negative numbers", range.role));
    }
    if !(range.min <= range.median && range.median <= range.max) {
        return Some(format!(
            "{}: median {} outside [{}, {}]",
            range.role, range.median, range.min, range.max
        ));
    }
    None
}
