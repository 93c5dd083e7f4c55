//! Axum route handlers for the two generation gateways.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::format_prompt;
use crate::models::{ArtifactKind, GenerationRequest, GenerationResponse};
use crate::state::AppState;

const MISSING_INPUT: &str = "Missing resume or job description";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-resume
///
/// Rewrites the résumé for the job description.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    generate(&state, ArtifactKind::Resume, payload).await
}

/// POST /api/generate-cover-letter
///
/// Writes a cover letter for the job description.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    generate(&state, ArtifactKind::Cover, payload).await
}

/// Shared gateway body: validate, format, complete, trim.
async fn generate(
    state: &AppState,
    kind: ArtifactKind,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;

    // Whitespace-only fields count as missing, so "   " is a 400 here.
    if !request.is_complete() {
        return Err(AppError::Validation(MISSING_INPUT.to_string()));
    }

    let prompt = format_prompt(kind, &request.resume, &request.job_description);
    let result = state
        .llm
        .complete(&prompt.user, prompt.system)
        .await
        .map_err(|e| AppError::generation(kind, e))?;

    info!("Generated {} ({} chars)", kind.label(), result.len());

    Ok(Json(GenerationResponse { result }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::llm_client::LlmClient;
    use crate::routes::build_router;
    use crate::state::AppState;

    fn make_app(llm_base_url: &str) -> Router {
        let llm = LlmClient::new("sk-test".to_string(), llm_base_url).unwrap();
        build_router(AppState { llm })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn mock_completion(server: &MockServer, marker: &str, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            })))
            .mount(server)
            .await;
    }

    // ── success ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_resume_gateway_returns_trimmed_result() {
        let server = MockServer::start().await;
        mock_completion(&server, "technical recruiter", "\n SUMMARY\nGo engineer \n").await;

        let (status, body) = post_json(
            make_app(&server.uri()),
            "/api/generate-resume",
            json!({
                "resume": "Senior backend engineer, 5 years Go",
                "jobDescription": "Looking for a backend engineer with distributed systems experience"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "SUMMARY\nGo engineer");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_cover_gateway_uses_cover_prompt() {
        let server = MockServer::start().await;
        mock_completion(&server, "cover letter writer", "Dear hiring manager").await;

        let (status, body) = post_json(
            make_app(&server.uri()),
            "/api/generate-cover-letter",
            json!({ "resume": "cv", "jobDescription": "jd" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "Dear hiring manager");
    }

    // ── validation ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_missing_or_blank_field_is_400_and_never_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for body in [
            json!({ "resume": "", "jobDescription": "jd" }),
            json!({ "resume": "cv" }),
            json!({}),
            json!({ "resume": "   ", "jobDescription": "jd" }),
            json!({ "resume": "cv", "jobDescription": "\n\t " }),
        ] {
            let (status, response) =
                post_json(make_app(&server.uri()), "/api/generate-resume", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "Missing resume or job description");
            assert!(response.get("result").is_none());
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let server = MockServer::start().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/generate-cover-letter")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = make_app(&server.uri()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ── upstream failure ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_upstream_failure_is_generic_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = post_json(
            make_app(&server.uri()),
            "/api/generate-resume",
            json!({ "resume": "cv", "jobDescription": "jd" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Something went wrong generating the resume.");
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn test_blank_completion_is_error_not_empty_result() {
        let server = MockServer::start().await;
        mock_completion(&server, "technical recruiter", "   ").await;

        let (status, body) = post_json(
            make_app(&server.uri()),
            "/api/generate-resume",
            json!({ "resume": "cv", "jobDescription": "jd" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("result").is_none());
    }
}
