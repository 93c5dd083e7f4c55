use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Résumé rewritten for the job description.
    Resume,
    /// Cover letter for the job description.
    Cover,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Resume, ArtifactKind::Cover];

    /// Stable identifier used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Resume => "resume",
            ArtifactKind::Cover => "cover",
        }
    }

    /// Human-readable name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Resume => "resume",
            ArtifactKind::Cover => "cover letter",
        }
    }

    /// Gateway route that produces this artifact.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ArtifactKind::Resume => "/api/generate-resume",
            ArtifactKind::Cover => "/api/generate-cover-letter",
        }
    }

    /// Deterministic download name for the exported PDF.
    pub fn export_filename(&self) -> &'static str {
        match self {
            ArtifactKind::Resume => "ai-optimized-resume.pdf",
            ArtifactKind::Cover => "ai-cover-letter.pdf",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownArtifactKind(pub String);

impl fmt::Display for UnknownArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown artifact kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownArtifactKind {}

impl FromStr for ArtifactKind {
    type Err = UnknownArtifactKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(ArtifactKind::Resume),
            "cover" => Ok(ArtifactKind::Cover),
            other => Err(UnknownArtifactKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trips_through_from_str() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.as_str().parse::<ArtifactKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "letter".parse::<ArtifactKind>().unwrap_err();
        assert_eq!(err, UnknownArtifactKind("letter".to_string()));
    }

    #[test]
    fn test_export_filenames_are_deterministic() {
        assert_eq!(
            ArtifactKind::Resume.export_filename(),
            "ai-optimized-resume.pdf"
        );
        assert_eq!(ArtifactKind::Cover.export_filename(), "ai-cover-letter.pdf");
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ArtifactKind::Cover).unwrap();
        assert_eq!(json, "\"cover\"");
    }
}
