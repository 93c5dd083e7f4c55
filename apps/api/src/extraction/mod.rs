// Text extraction for uploaded résumé files.
// PDF parsing is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod handlers;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How an uploaded file's text is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// Read directly as UTF-8.
    PlainText,
    /// Sent through the PDF text extractor.
    Pdf,
}

impl UploadKind {
    /// Classifies a file by extension first, then by MIME type.
    /// Returns `None` for anything that is neither plain text nor PDF.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Option<UploadKind> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => return Some(UploadKind::Pdf),
            Some("txt") | Some("text") | Some("md") => return Some(UploadKind::PlainText),
            _ => {}
        }

        let mime = mime?.split(';').next()?.trim().to_ascii_lowercase();
        if mime == "application/pdf" {
            Some(UploadKind::Pdf)
        } else if mime.starts_with("text/") {
            Some(UploadKind::PlainText)
        } else {
            None
        }
    }
}

/// Body returned by the extraction endpoint on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    pub text: String,
}

/// Extracts the text layer of a PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| format!("Could not read PDF: {e}"))
}

/// Decodes a plain-text upload.
pub fn decode_plain_text(bytes: &[u8]) -> Result<String, String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| "File is not valid UTF-8 text".to_string())
}
