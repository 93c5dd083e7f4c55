//! HTTP client for the generation gateways, used by the workflow.

pub mod upload;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{ArtifactKind, GenerationRequest, GenerationResponse};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the server's `error` field when present.
    #[error("Gateway rejected request (status {status}): {message:?}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Gateway returned an empty result")]
    EmptyResult,
}

impl GatewayError {
    /// Single user-facing message for a failed generation.
    pub fn user_message(&self, kind: ArtifactKind) -> String {
        match self {
            GatewayError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            GatewayError::Http(e) if e.is_connect() || e.is_timeout() => {
                "Could not reach the server. Please try again.".to_string()
            }
            _ => format!("Failed to generate {}", kind.label()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Seam between the workflow and whatever produces generated text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        kind: ArtifactKind,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError>;
}

/// Calls the gateway endpoints over HTTP.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(180)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GenerationBackend for GatewayClient {
    async fn generate(
        &self,
        kind: ArtifactKind,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, kind.endpoint_path()))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body).ok().map(|b| b.error);
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let GenerationResponse { result } = response.json().await?;
        debug!("Gateway returned {} chars for {kind}", result.len());

        if result.trim().is_empty() {
            return Err(GatewayError::EmptyResult);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_posts_wire_body_to_kind_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-cover-letter"))
            .and(body_json(json!({ "resume": "cv", "jobDescription": "jd" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "Dear team" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let text = client
            .generate(ArtifactKind::Cover, &GenerationRequest::new("cv", "jd"))
            .await
            .unwrap();
        assert_eq!(text, "Dear team");
    }

    #[tokio::test]
    async fn test_rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "Missing resume or job description" })),
            )
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let err = client
            .generate(ArtifactKind::Resume, &GenerationRequest::new("cv", "jd"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { status: 400, .. }));
        assert_eq!(
            err.user_message(ArtifactKind::Resume),
            "Missing resume or job description"
        );
    }

    #[tokio::test]
    async fn test_rejection_without_body_uses_fallback_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let err = client
            .generate(ArtifactKind::Cover, &GenerationRequest::new("cv", "jd"))
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(ArtifactKind::Cover),
            "Failed to generate cover letter"
        );
    }

    #[tokio::test]
    async fn test_blank_result_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "  " })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        assert!(matches!(
            client
                .generate(ArtifactKind::Resume, &GenerationRequest::new("cv", "jd"))
                .await,
            Err(GatewayError::EmptyResult)
        ));
    }
}
