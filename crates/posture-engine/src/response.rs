use posture_core::{Classification, IndexSet};
use serde::{Deserialize, Serialize};

use crate::report::Report;

pub const LINK_FAILURE: &str = "link failure";
pub const TARGET_NOT_IDENTIFIED: &str = "target not identified";
pub const METHOD_NOT_ALLOWED: &str = "method not allowed";

/// Narrative returned in place of a report whenever the directory link fails.
pub const CRITICAL_ERROR_ANALYSIS: &str =
    "CRITICAL ERROR // DIRECTORY LINK SEVERED. Target data could not be acquired and no assessment was produced. Verify the target designation and retry.";
pub const MISSING_TARGET_ANALYSIS: &str =
    "No target designated. Provide a country name to run an assessment.";
pub const METHOD_NOT_ALLOWED_ANALYSIS: &str = "This endpoint does not accept that request method.";

/// Outward contract of a successful assessment.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub scores: IndexSet,
    pub metadata: Classification,
}

/// Failure body: a short machine code plus a displayable fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub analysis: String,
}

pub struct ResponseAssembler;

impl ResponseAssembler {
    pub fn assemble(
        report: &Report,
        scores: IndexSet,
        metadata: Classification,
    ) -> AnalysisResponse {
        AnalysisResponse {
            analysis: report.render(),
            scores,
            metadata,
        }
    }

    pub fn failure(error: impl Into<String>, analysis: impl Into<String>) -> ErrorResponse {
        ErrorResponse {
            error: error.into(),
            analysis: analysis.into(),
        }
    }

    pub fn link_failure() -> ErrorResponse {
        Self::failure(LINK_FAILURE, CRITICAL_ERROR_ANALYSIS)
    }

    pub fn missing_target() -> ErrorResponse {
        Self::failure(TARGET_NOT_IDENTIFIED, MISSING_TARGET_ANALYSIS)
    }

    pub fn method_not_allowed() -> ErrorResponse {
        Self::failure(METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_ANALYSIS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_failure_body() {
        let body = serde_json::to_value(ResponseAssembler::link_failure()).unwrap();
        assert_eq!(body["error"], "link failure");
        assert_eq!(body["analysis"], CRITICAL_ERROR_ANALYSIS);
    }

    #[test]
    fn test_missing_target_body() {
        let body = ResponseAssembler::missing_target();
        assert_eq!(body.error, TARGET_NOT_IDENTIFIED);
        assert!(!body.analysis.is_empty());
    }
}
