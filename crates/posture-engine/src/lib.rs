//! Composite scoring and classification of a country's geopolitical posture.
//!
//! Pipeline: directory documents → [`AttributeExtractor`] → [`ScoringEngine`]
//! → [`ClassificationEngine`] → [`Report`] → [`ResponseAssembler`].

use posture_core::{DirectoryLookup, FormulaVersion, LearningState, PostureError, RequestStage};
use std::sync::Arc;

pub mod classification;
pub mod extractor;
pub mod report;
pub mod response;
pub mod scoring;

pub use classification::ClassificationEngine;
pub use extractor::AttributeExtractor;
pub use report::{Gauge, Report, Section};
pub use response::{AnalysisResponse, ErrorResponse, ResponseAssembler};
pub use scoring::ScoringEngine;

/// Request-scoped pipeline over a shared, read-only calibration.
pub struct PostureEngine {
    directory: Arc<dyn DirectoryLookup>,
    scoring: ScoringEngine,
}

impl PostureEngine {
    pub fn new(
        directory: Arc<dyn DirectoryLookup>,
        learning: LearningState,
        version: FormulaVersion,
    ) -> Self {
        Self {
            directory,
            scoring: ScoringEngine::new(learning, version),
        }
    }

    pub fn learning(&self) -> &LearningState {
        self.scoring.learning()
    }

    pub fn formula_version(&self) -> FormulaVersion {
        self.scoring.version()
    }

    /// Run every stage after the fetch on an already retrieved match sequence.
    pub fn evaluate(
        &self,
        documents: &serde_json::Value,
    ) -> Result<AnalysisResponse, PostureError> {
        let attrs = AttributeExtractor::extract(documents)?;
        tracing::debug!(
            stage = %RequestStage::Extracted,
            entity = %attrs.id,
            "attributes extracted"
        );

        let indices = self.scoring.score(&attrs);
        tracing::debug!(
            stage = %RequestStage::Scored,
            entity = %attrs.id,
            power = indices.power,
            domino = indices.domino,
            "indices derived"
        );

        let classification = ClassificationEngine::classify(&attrs, &indices);
        tracing::debug!(
            stage = %RequestStage::Classified,
            entity = %attrs.id,
            tier = ?classification.power_tier,
            "entity classified"
        );

        let report = Report::build(&attrs, &indices, &classification, self.learning());
        tracing::debug!(
            stage = %RequestStage::Rendered,
            entity = %attrs.id,
            sections = report.sections().len(),
            "report built"
        );

        Ok(ResponseAssembler::assemble(&report, indices, classification))
    }

    /// Fetch `country` from the directory and assess it. One upstream attempt.
    pub async fn analyze(&self, country: &str) -> Result<AnalysisResponse, PostureError> {
        tracing::debug!(stage = %RequestStage::Received, "analyze request");
        let country = country.trim();
        if country.is_empty() {
            tracing::info!(stage = %RequestStage::Rejected, "empty target");
            return Err(PostureError::Validation("country is required".to_string()));
        }

        tracing::debug!(stage = %RequestStage::Fetching, country, "querying directory");
        let outcome = match self.directory.lookup(country).await {
            Ok(documents) => self.evaluate(&documents),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(_) => {
                tracing::info!(stage = %RequestStage::Responded, country, "assessment complete")
            }
            Err(e) => {
                tracing::warn!(
                    stage = %RequestStage::Failed,
                    country,
                    error = %e,
                    "assessment failed"
                )
            }
        }
        outcome
    }
}
