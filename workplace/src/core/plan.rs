//! Recovery of a [`SprintPlan`] from free-form LLM output.
//!
//! Models are asked for a bare JSON object but routinely wrap it in code
//! fences or surround it with prose. Recovery tries, in order: the
//! fence-stripped text, the first balanced `{...}` span, and the greedy span
//! from the first `{` to the last `}`.

use thiserror::Error;

use crate::core::types::SprintPlan;

/// Why a plan could not be recovered.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("model output is empty")]
    Empty,
    #[error("model output is not a valid plan: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("plan has no tickets")]
    NoTickets,
}

/// Remove ```` ```json ```` and ```` ``` ```` markers anywhere in the text.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse model output into a plan, recovering from fences and prose.
pub fn parse_sprint_plan(raw: &str) -> Result<SprintPlan, PlanParseError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(PlanParseError::Empty);
    }

    let first_err = match parse_strict(&cleaned) {
        Ok(plan) => return Ok(plan),
        Err(err) => err,
    };

    let candidates = [balanced_object_span(&cleaned), greedy_object_span(&cleaned)];
    for span in candidates.into_iter().flatten() {
        if span == cleaned {
            continue;
        }
        if let Ok(plan) = parse_strict(span) {
            return Ok(plan);
        }
    }

    Err(first_err)
}

fn parse_strict(text: &str) -> Result<SprintPlan, PlanParseError> {
    let plan: SprintPlan = serde_json::from_str(text)?;
    if plan.tickets.is_empty() {
        return Err(PlanParseError::NoTickets);
    }
    Ok(plan)
}

/// First `{...}` span whose braces balance, ignoring braces inside strings.
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

fn greedy_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
