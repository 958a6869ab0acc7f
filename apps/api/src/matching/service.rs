//! Match Service — orchestrates the matching pipeline.
//!
//! Flow: build prompt → model call through the pool → normalize → check that the
//! returned profile ids are exactly the requested ones → return.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::pool::ModelPool;
use crate::llm_client::TextModel;
use crate::matching::prompts::build_match_prompt;
use crate::matching::validator::normalize_model_output;
use crate::models::matching::{MatchRequest, MatchResponse, MatchResult};

#[derive(Clone)]
pub struct MatchService {
    model: Arc<dyn TextModel>,
    pool: ModelPool,
}

impl MatchService {
    pub fn new(model: Arc<dyn TextModel>, pool: ModelPool) -> Self {
        Self { model, pool }
    }

    /// Scores every profile in `request` against its project.
    /// Either every requested profile is scored exactly once or the call fails.
    pub async fn generate_match(&self, request: &MatchRequest) -> Result<MatchResponse, AppError> {
        if request.profiles.is_empty() {
            info!("No profiles in request, skipping model call");
            return Ok(MatchResponse::default());
        }

        let prompt = build_match_prompt(request)?;

        info!("Sending prompt to model ({} chars)", prompt.len());
        let raw = self.pool.run(self.model.generate(&prompt)).await?;

        let response = normalize_model_output(&raw)?;

        let requested: Vec<i64> = request.profiles.iter().map(|p| p.profile_id).collect();
        verify_profile_ids(&requested, &response.matches)?;

        info!(
            "Match completed: {} profiles scored",
            response.matches.len()
        );

        Ok(response)
    }
}

/// Requires the returned ids to be a permutation of the requested ids.
fn verify_profile_ids(requested: &[i64], matches: &[MatchResult]) -> Result<(), AppError> {
    let expected: BTreeSet<i64> = requested.iter().copied().collect();

    let mut seen: BTreeMap<i64, usize> = BTreeMap::new();
    for m in matches {
        *seen.entry(m.profile_id).or_default() += 1;
    }

    let missing: Vec<i64> = expected
        .iter()
        .filter(|id| !seen.contains_key(id))
        .copied()
        .collect();
    let unknown: Vec<i64> = seen
        .keys()
        .filter(|id| !expected.contains(id))
        .copied()
        .collect();
    let duplicated: Vec<i64> = seen
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| *id)
        .collect();

    if missing.is_empty() && unknown.is_empty() && duplicated.is_empty() {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing profiles {missing:?}"));
    }
    if !unknown.is_empty() {
        problems.push(format!("unknown profiles {unknown:?}"));
    }
    if !duplicated.is_empty() {
        problems.push(format!("duplicated profiles {duplicated:?}"));
    }

    Err(AppError::MalformedResponse(format!(
        "Model response does not match the requested profiles: {}",
        problems.join("; ")
    )))
}
