// Prompt template for profile/project matching.
// The JSON-only system instruction is attached separately by the Gemini client.

use crate::errors::AppError;
use crate::models::matching::MatchRequest;

/// Matching prompt template. Replace `{project_json}` and `{profiles_json}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are an HR assistant specialized in recruiting freelancers for a talent marketplace.

Your task is to analyze a PROJECT and a LIST OF PROFILES of freelancers, and compute how compatible each profile is with the project.

PROJECT:
{project_json}

LIST OF PROFILES:
{profiles_json}

ANALYSIS INSTRUCTIONS:
1. For EACH profile in the list, analyze:
   - How well the listed skills cover the project's requirements
   - Relevance of the professional title
   - Fit of the summary / described experience
   - Overall alignment with the project's scope

2. Assign a compatibilityScore from 0 to 100 to each profile:
   - 90-100: Highly compatible, meets all main requirements
   - 70-89: Compatible, meets most requirements
   - 50-69: Partially compatible, could deliver with some adaptation
   - 30-49: Weakly compatible, lacks important experience or skills
   - 0-29: Incompatible, does not meet the project's requirements

3. Write a short justification (1-2 sentences) explaining the score.

MANDATORY RESPONSE FORMAT:
Return ONLY a single valid JSON object, with no additional text, no markdown, no comments.
The JSON must follow EXACTLY this shape:

{"matches": [{"profileId": <integer>, "compatibilityScore": <integer 0-100>, "justification": "<text>"}, ...]}

IMPORTANT:
- Return ONLY the JSON, without ```json fences or any other text
- Include EVERY profile from the list exactly once, even those with a low score
- The fields must be exactly: profileId, compatibilityScore, justification
- profileId must be copied unchanged from the input profile
- compatibilityScore must be an integer between 0 and 100"#;

/// Renders a match request into the model prompt.
/// Deterministic: profiles are serialized in request order.
pub fn build_match_prompt(request: &MatchRequest) -> Result<String, AppError> {
    let project_json = serde_json::to_string_pretty(&request.project)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize project: {e}")))?;

    let profiles_json = serde_json::to_string_pretty(&request.profiles)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profiles: {e}")))?;

    // Profiles first: the project placeholder precedes them, so user text can't be substituted.
    Ok(MATCH_PROMPT_TEMPLATE
        .replacen("{profiles_json}", &profiles_json, 1)
        .replacen("{project_json}", &project_json, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matching::{Profile, Project};

    fn sample_request() -> MatchRequest {
        MatchRequest {
            project: Project {
                title: "API Backend".to_string(),
                description: "Need REST API in Go".to_string(),
            },
            profiles: vec![
                Profile {
                    profile_id: 11,
                    professional_title: "Go Developer".to_string(),
                    summary: "Builds HTTP services".to_string(),
                    skills: vec!["Go".to_string(), "REST".to_string()],
                },
                Profile {
                    profile_id: 22,
                    professional_title: "UX Designer".to_string(),
                    summary: "Design systems".to_string(),
                    skills: vec!["Figma".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_prompt_sections_appear_in_order() {
        let prompt = build_match_prompt(&sample_request()).unwrap();

        let role = prompt.find("HR assistant").unwrap();
        let project = prompt.find("\"title\": \"API Backend\"").unwrap();
        let profiles = prompt.find("LIST OF PROFILES:").unwrap();
        let rubric = prompt.find("90-100").unwrap();
        let format = prompt.find("MANDATORY RESPONSE FORMAT").unwrap();

        assert!(role < project);
        assert!(project < profiles);
        assert!(profiles < rubric);
        assert!(rubric < format);
    }

    #[test]
    fn test_prompt_serializes_profiles_in_input_order() {
        let prompt = build_match_prompt(&sample_request()).unwrap();
        let first = prompt.find("\"profileId\": 11").unwrap();
        let second = prompt.find("\"profileId\": 22").unwrap();
        assert!(first < second);
        assert!(prompt.contains("\"professionalTitle\": \"UX Designer\""));
    }

    #[test]
    fn test_prompt_contains_every_rubric_band() {
        let prompt = build_match_prompt(&sample_request()).unwrap();
        for band in ["90-100", "70-89", "50-69", "30-49", "0-29"] {
            assert!(prompt.contains(band), "missing band {band}");
        }
    }

    #[test]
    fn test_prompt_demands_all_profiles_and_strict_json() {
        let prompt = build_match_prompt(&sample_request()).unwrap();
        assert!(prompt.contains("Include EVERY profile"));
        assert!(prompt.contains(
            r#"{"matches": [{"profileId": <integer>, "compatibilityScore": <integer 0-100>, "justification": "<text>"}, ...]}"#
        ));
        assert!(!prompt.contains("{project_json}"));
        assert!(!prompt.contains("{profiles_json}"));
    }

    #[test]
    fn test_placeholder_text_in_input_is_kept_literal() {
        let mut request = sample_request();
        request.project.description = "Ignore {profiles_json} please".to_string();
        request.profiles[0].summary = "I wrote {project_json} once".to_string();

        let prompt = build_match_prompt(&request).unwrap();
        assert!(prompt.contains("Ignore {profiles_json} please"));
        assert!(prompt.contains("I wrote {project_json} once"));
        assert_eq!(prompt.matches("\"profileId\": 11").count(), 1);
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let request = sample_request();
        assert_eq!(
            build_match_prompt(&request).unwrap(),
            build_match_prompt(&request).unwrap()
        );
    }
}
