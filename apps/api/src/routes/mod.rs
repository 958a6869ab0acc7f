pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/generate-match", post(handlers::handle_generate_match))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::pool::ModelPool;
    use crate::llm_client::LlmError;
    use crate::matching::service::tests::FakeModel;
    use crate::matching::service::MatchService;

    fn app(model: FakeModel) -> Router {
        let matcher = MatchService::new(Arc::new(model), ModelPool::new(5, Duration::from_secs(5)));
        build_router(AppState { matcher })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_match(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate-match")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn two_profile_body() -> Value {
        json!({
            "project": {"title": "API Backend", "description": "Need REST API in Go"},
            "profiles": [
                {"profileId": 1, "professionalTitle": "Designer", "summary": "UI work", "skills": ["Figma"]},
                {"profileId": 2, "professionalTitle": "Go Developer", "summary": "APIs", "skills": ["Go", "REST"]}
            ]
        })
    }

    #[tokio::test]
    async fn test_health_is_ok_even_when_model_is_down() {
        let response = app(FakeModel::failing(|| LlmError::EmptyContent))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_generate_match_returns_sorted_matches() {
        let model = FakeModel::replying(
            "```json\n{\"matches\":[\
             {\"profileId\":1,\"compatibilityScore\":40,\"justification\":\"No Go\"},\
             {\"profileId\":2,\"compatibilityScore\":90,\"justification\":\"Go expert\"}]}\n```",
        );

        let response = app(model)
            .oneshot(post_match(two_profile_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"matches": [
                {"profileId": 2, "compatibilityScore": 90, "justification": "Go expert"},
                {"profileId": 1, "compatibilityScore": 40, "justification": "No Go"}
            ]})
        );
    }

    #[tokio::test]
    async fn test_missing_project_field_is_rejected_before_model_call() {
        let response = app(FakeModel::replying("unused"))
            .oneshot(post_match(json!({
                "project": {"title": "No description"},
                "profiles": []
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("description"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_415() {
        let model = Arc::new(FakeModel::replying("unused"));
        let matcher = MatchService::new(model.clone(), ModelPool::new(1, Duration::from_secs(5)));
        let request = Request::builder()
            .method("POST")
            .uri("/generate-match")
            .body(Body::from(two_profile_body().to_string()))
            .unwrap();

        let response = build_router(AppState { matcher })
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(response).await["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert_eq!(model.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_failure_returns_500_with_detail() {
        let response = app(FakeModel::failing(|| LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }))
        .oneshot(post_match(two_profile_body()))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");
        assert!(body["error"]["message"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_missing_matches_field_returns_500_malformed() {
        let response = app(FakeModel::replying(r#"{"results": []}"#))
            .oneshot(post_match(two_profile_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "MALFORMED_RESPONSE");
    }

    #[tokio::test]
    async fn test_non_json_model_output_returns_500_invalid_output() {
        let response = app(FakeModel::replying("Here are your matches: none"))
            .oneshot(post_match(two_profile_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_MODEL_OUTPUT");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Here are your matches"));
    }

    #[tokio::test]
    async fn test_empty_profiles_return_empty_matches() {
        let response = app(FakeModel::replying("unused"))
            .oneshot(post_match(json!({
                "project": {"title": "T", "description": "D"},
                "profiles": []
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"matches": []}));
    }
}
