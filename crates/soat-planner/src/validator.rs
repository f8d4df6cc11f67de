//! Turns a raw model answer into a [`Plan`], or explains why it cannot.

use serde_json::Value;
use thiserror::Error;

use soat_core::types::{Action, Plan};

#[derive(Debug, Error)]
pub enum PlanFormatError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response has no top-level 'actions' field")]
    MissingActions,

    #[error("'actions' is not a list")]
    ActionsNotArray,

    #[error("'actions' is empty")]
    EmptyActions,
}

/// Only the envelope is checked here: `actions` must be a non-empty list.
/// Individual elements are accepted as-is and classified by [`Action::from_value`].
pub fn parse(raw: &str) -> Result<Plan, PlanFormatError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    let actions = value.get("actions").ok_or(PlanFormatError::MissingActions)?;
    let items = actions.as_array().ok_or(PlanFormatError::ActionsNotArray)?;
    if items.is_empty() {
        return Err(PlanFormatError::EmptyActions);
    }
    Ok(Plan::new(items.iter().enumerate().map(|(i, v)| Action::from_value(v, i)).collect()))
}

/// Remove a Markdown code fence (with an optional `json` tag) around the answer.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches('`');
    let rest = rest.strip_suffix("```").unwrap_or(rest).trim_end_matches('`').trim();
    match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => rest[4..].trim(),
        _ => rest,
    }
}
