use serde::{Deserialize, Serialize};

/// The project candidates are scored against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
}

/// A candidate profile as sent by the calling backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_id: i64,
    pub professional_title: String,
    pub summary: String,
    pub skills: Vec<String>,
}

/// Request body for POST /generate-match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub project: Project,
    pub profiles: Vec<Profile>,
}

/// One scored profile. `compatibility_score` is always within 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub profile_id: i64,
    pub compatibility_score: u8,
    pub justification: String,
}

/// Matches sorted by `compatibility_score`, highest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchResult>,
}
