//! Client side of the file-upload sub-flow.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::extraction::{decode_plain_text, UploadKind};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("Could not read file: {0}")]
    Read(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extraction service rejected the file (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("No text found in file")]
    Empty,
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Unsupported(_) => {
                "Unsupported file type. Please upload a .txt or .pdf file, or paste your resume manually."
                    .to_string()
            }
            UploadError::Empty => {
                "We couldn't find any text in that file. Please paste your resume manually."
                    .to_string()
            }
            _ => "Could not read that file. Please try again or paste your resume manually."
                .to_string(),
        }
    }
}

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = std::fs::read(path).map_err(|e| UploadError::Read(e.to_string()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(name, None, bytes))
    }
}

/// Turns a PDF upload into text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_pdf(&self, file: &UploadedFile) -> Result<String, UploadError>;
}

#[derive(Debug, Deserialize)]
struct ExtractionBody {
    text: Option<String>,
    error: Option<String>,
}

/// Posts the file to the extraction endpoint as `multipart/form-data`.
#[derive(Clone)]
pub struct HttpTextExtractor {
    client: Client,
    url: String,
}

impl HttpTextExtractor {
    pub fn new(base_url: &str) -> Result<Self, UploadError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            url: format!("{}/api/extract-text", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract_pdf(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(file.mime.as_deref().unwrap_or("application/pdf"))?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        let raw = response.text().await?;
        let body = serde_json::from_str::<ExtractionBody>(&raw).ok();

        match body {
            Some(ExtractionBody {
                error: Some(message),
                ..
            }) => Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            }),
            Some(ExtractionBody {
                text: Some(text), ..
            }) if status.is_success() => Ok(text),
            _ => Err(UploadError::Rejected {
                status: status.as_u16(),
                message: raw,
            }),
        }
    }
}

/// Reads the text of an uploaded file: plain text directly, PDFs through
/// `extractor`. Blank results are an error.
pub async fn read_upload(
    file: &UploadedFile,
    extractor: &dyn TextExtractor,
) -> Result<String, UploadError> {
    let kind = UploadKind::detect(&file.name, file.mime.as_deref())
        .ok_or_else(|| UploadError::Unsupported(file.name.clone()))?;

    let text = match kind {
        UploadKind::PlainText => decode_plain_text(&file.bytes).map_err(UploadError::Read)?,
        UploadKind::Pdf => extractor.extract_pdf(file).await?,
    };

    if text.trim().is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(text)
}
