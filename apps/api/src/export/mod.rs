//! PDF Export Adapter: turns the displayed text of an artifact into a
//! paginated A4 document saved under the artifact's export file name.

pub mod layout;
pub mod metrics;
pub mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::ArtifactKind;

pub use layout::{paginate, wrap_text, ExportConfig, Page, PlacedLine};
pub use metrics::HELVETICA;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("Could not write PDF: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn user_message(&self) -> &'static str {
        "Could not generate PDF"
    }
}

/// Renders `text` as PDF bytes.
pub fn render_pdf(text: &str, config: &ExportConfig) -> Result<Vec<u8>, ExportError> {
    if text.trim().is_empty() {
        return Err(ExportError::Empty);
    }
    let lines = wrap_text(text, &HELVETICA, config);
    let pages = paginate(lines, config);
    pdf::render(&pages, &HELVETICA, config)
}

/// Writes `text` to `dir/<export file name for kind>` and returns the path.
pub fn export_to_dir(text: &str, kind: ArtifactKind, dir: &Path) -> Result<PathBuf, ExportError> {
    let bytes = render_pdf(text, &ExportConfig::default())?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(kind.export_filename());
    std::fs::write(&path, &bytes)?;
    info!("Exported {} to {} ({} bytes)", kind.label(), path.display(), bytes.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;

    #[test]
    fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_to_dir("Jane Doe\n\nSummary", ArtifactKind::Resume, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "ai-optimized-resume.pdf");

        let bytes = std::fs::read(&path).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_text_spans_pages() {
        let text = (0..120).map(|n| format!("Line {n}")).collect::<Vec<_>>().join("\n");
        let bytes = render_pdf(&text, &ExportConfig::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_to_dir("   ", ArtifactKind::Cover, dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
        assert_eq!(err.user_message(), "Could not generate PDF");
        assert!(!dir.path().join("ai-cover-letter.pdf").exists());
    }
}
