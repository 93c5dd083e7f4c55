use axum::extract::Multipart;
use axum::Json;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::{decode_plain_text, extract_pdf_text, ExtractTextResponse, UploadKind};

/// POST /api/extract-text
///
/// Accepts `multipart/form-data` with a `file` field and returns `{ text }`.
/// Empty output after extraction is an error, never an empty success.
pub async fn handle_extract_text(
    mut multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let kind = UploadKind::detect(&file_name, content_type.as_deref()).ok_or_else(|| {
            AppError::Validation("Only .txt and .pdf files are supported".to_string())
        })?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        let text = match kind {
            UploadKind::PlainText => decode_plain_text(&data).map_err(AppError::Extraction)?,
            UploadKind::Pdf => tokio::task::spawn_blocking(move || extract_pdf_text(&data))
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
                })?
                .map_err(AppError::Extraction)?,
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(AppError::Extraction(
                "No text could be extracted from the file".to_string(),
            ));
        }

        info!("Extracted {} chars from {file_name} ({kind:?})", text.len());
        return Ok(Json(ExtractTextResponse { text }));
    }

    Err(AppError::Validation(
        "Missing 'file' field in upload".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::llm_client::LlmClient;
    use crate::routes::build_router;
    use crate::state::AppState;

    const BOUNDARY: &str = "tailor-test-boundary";

    fn make_app() -> Router {
        let llm = LlmClient::new("sk-test".to_string(), "http://127.0.0.1:9").unwrap();
        build_router(AppState { llm })
    }

    fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn upload(body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/extract-text")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = make_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_plain_text_upload_returns_trimmed_text() {
        let (status, body) = upload(multipart_body(
            "file",
            "cv.txt",
            "text/plain",
            b"  Jane Doe\nBackend engineer\n\n",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Jane Doe\nBackend engineer");
    }

    #[tokio::test]
    async fn test_blank_text_upload_is_error() {
        let (status, body) = upload(multipart_body("file", "cv.txt", "text/plain", b" \n ")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_error() {
        let (status, body) = upload(multipart_body(
            "file",
            "cv.pdf",
            "application/pdf",
            b"not really a pdf",
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.get("text").is_none());
    }

    #[tokio::test]
    async fn test_unsupported_type_is_400() {
        let (status, _) = upload(multipart_body(
            "file",
            "cv.docx",
            "application/octet-stream",
            b"PK",
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_400() {
        let (status, body) =
            upload(multipart_body("attachment", "cv.txt", "text/plain", b"hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'file' field in upload");
    }
}
