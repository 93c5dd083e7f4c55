use serde::{Deserialize, Serialize};

/// Body of both generation endpoints.
///
/// Missing fields deserialize to empty strings so the gateway can reject them
/// with its own 400 instead of a framework rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
}

impl GenerationRequest {
    pub fn new(resume: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume: resume.into(),
            job_description: job_description.into(),
        }
    }

    /// True when both inputs carry non-whitespace text.
    pub fn is_complete(&self) -> bool {
        !self.resume.trim().is_empty() && !self.job_description.trim().is_empty()
    }
}

/// Successful gateway response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub result: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case_wire_names() {
        let req = GenerationRequest::new("cv", "jd");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["resume"], "cv");
        assert_eq!(json["jobDescription"], "jd");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let req: GenerationRequest = serde_json::from_str(r#"{"resume":"cv"}"#).unwrap();
        assert_eq!(req.job_description, "");
        assert!(!req.is_complete());
    }

    #[test]
    fn test_whitespace_only_is_incomplete() {
        assert!(!GenerationRequest::new("   ", "jd").is_complete());
        assert!(GenerationRequest::new("cv", "jd").is_complete());
    }
}
