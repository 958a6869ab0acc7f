//! Axum route handlers for the Matching API.

use std::collections::HashSet;

use axum::{extract::FromRequest, extract::State, Json};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::matching::{MatchRequest, MatchResponse};
use crate::state::AppState;

/// JSON body extractor whose rejections use the `AppError` response shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidatedJson<T>(pub T);

/// POST /generate-match
///
/// Scores each profile against the project with the model and returns the
/// matches sorted by compatibility, highest first.
pub async fn handle_generate_match(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let span = info_span!(
        "generate_match",
        request_id = %Uuid::new_v4(),
        profiles = request.profiles.len()
    );

    async move {
        info!("Received match request for project '{}'", request.project.title);

        reject_duplicate_profiles(&request)?;

        let response = state.matcher.generate_match(&request).await?;
        Ok::<_, AppError>(Json(response))
    }
    .instrument(span)
    .await
}

fn reject_duplicate_profiles(request: &MatchRequest) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(request.profiles.len());
    for profile in &request.profiles {
        if !seen.insert(profile.profile_id) {
            return Err(AppError::Validation(format!(
                "profileId {} appears more than once",
                profile.profile_id
            )));
        }
    }
    Ok(())
}
