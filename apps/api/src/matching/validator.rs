//! Response Validator — turns raw model text into a `MatchResponse`.
//!
//! Steps: trim → strip code fences → parse as untyped JSON → require the
//! `matches` list and per-item fields → clamp scores → stable sort by score.
//! Any shape mismatch fails the whole batch; score clamping is the only coercion.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::matching::{MatchResponse, MatchResult};

/// Max characters of offending model text carried in diagnostics.
pub const PREVIEW_CHARS: usize = 200;

const MIN_SCORE: i64 = 0;
const MAX_SCORE: i64 = 100;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{source}. Received: {preview}")]
    InvalidModelOutput {
        source: serde_json::Error,
        preview: String,
    },

    #[error("{0}")]
    MalformedResponse(String),
}

/// Validates and normalizes raw model output.
pub fn normalize_model_output(raw: &str) -> Result<MatchResponse, NormalizeError> {
    let text = strip_json_fences(raw);

    let value: Value =
        serde_json::from_str(text).map_err(|source| NormalizeError::InvalidModelOutput {
            source,
            preview: preview(text),
        })?;

    let items = value
        .get("matches")
        .ok_or_else(|| malformed("Model response does not contain the 'matches' field"))?
        .as_array()
        .ok_or_else(|| malformed("'matches' must be a list"))?;

    let mut matches = items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_match(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    // sort_by is stable: ties keep the model's order
    matches.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));

    Ok(MatchResponse { matches })
}

fn parse_match(index: usize, item: &Value) -> Result<MatchResult, NormalizeError> {
    let fields = item
        .as_object()
        .ok_or_else(|| malformed(format!("Match #{index} is not an object")))?;

    let profile_id = require(fields, index, "profileId")?
        .as_i64()
        .ok_or_else(|| malformed(format!("Match #{index}: 'profileId' must be an integer")))?;

    let compatibility_score = clamp_score(require(fields, index, "compatibilityScore")?)
        .ok_or_else(|| {
            malformed(format!(
                "Match #{index}: 'compatibilityScore' must be a number"
            ))
        })?;

    let justification = require(fields, index, "justification")?
        .as_str()
        .ok_or_else(|| malformed(format!("Match #{index}: 'justification' must be a string")))?
        .to_string();

    Ok(MatchResult {
        profile_id,
        compatibility_score,
        justification,
    })
}

fn require<'a>(
    fields: &'a Map<String, Value>,
    index: usize,
    key: &str,
) -> Result<&'a Value, NormalizeError> {
    fields
        .get(key)
        .ok_or_else(|| malformed(format!("Match #{index} is missing the '{key}' field")))
}

/// Truncates toward zero, then clamps into 0..=100. `None` for non-numbers.
fn clamp_score(value: &Value) -> Option<u8> {
    let score = if let Some(i) = value.as_i64() {
        i
    } else if value.is_u64() {
        MAX_SCORE
    } else {
        // `as` saturates out-of-range floats
        value.as_f64()?.trunc() as i64
    };
    Some(score.clamp(MIN_SCORE, MAX_SCORE) as u8)
}

/// Strips ```<tag> ... ``` code fences from model output, whatever the tag.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let text = match text.strip_prefix("```") {
        Some(rest) => skip_fence_tag(rest),
        None => text,
    };
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// The tag runs up to the first newline or JSON opener.
fn skip_fence_tag(rest: &str) -> &str {
    match rest.find(|c: char| c == '\n' || c == '{' || c == '[') {
        Some(end) => &rest[end..],
        None => rest,
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn malformed(msg: impl Into<String>) -> NormalizeError {
    NormalizeError::MalformedResponse(msg.into())
}
