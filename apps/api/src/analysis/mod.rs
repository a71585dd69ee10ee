// Resume Analysis Engine
// Pipeline: extractor → {matcher → gaps} + {experience} → scoring.
// Stateless per call; the taxonomy and recommendation tables are the only
// shared data and are read-only after startup.

pub mod error;
pub mod experience;
pub mod extractor;
pub mod gaps;
pub mod matcher;
pub mod scoring;
pub mod taxonomy;

use std::io::{Cursor, Read, Seek};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

pub use error::AnalysisError;
pub use experience::ExperienceLevel;
pub use extractor::DocumentFormat;
pub use gaps::{RecommendationTable, SkillGap};
pub use matcher::FoundSkill;
pub use scoring::AnalysisResult;
pub use taxonomy::{SkillCategory, SkillTaxonomy};

use crate::analysis::experience::estimate_experience;
use crate::analysis::extractor::extract_document;
use crate::analysis::gaps::recommend_gaps;
use crate::analysis::matcher::match_skills;
use crate::analysis::scoring::aggregate;

/// Runs the full analysis pipeline against injected lookup tables.
///
/// Holds no per-call state; one instance is shared across all requests and
/// the background worker.
#[derive(Debug, Clone)]
pub struct ResumeAnalyzer {
    taxonomy: Arc<SkillTaxonomy>,
    recommendations: Arc<RecommendationTable>,
}

impl ResumeAnalyzer {
    pub fn new(taxonomy: Arc<SkillTaxonomy>, recommendations: Arc<RecommendationTable>) -> Self {
        Self {
            taxonomy,
            recommendations,
        }
    }

    #[cfg(test)]
    pub fn with_builtin_tables() -> Self {
        Self::new(
            Arc::new(SkillTaxonomy::builtin()),
            Arc::new(RecommendationTable::builtin()),
        )
    }

    /// Extracts the document behind `reader` and analyzes its text.
    /// No partial results: extraction failure stops the pipeline.
    pub fn analyze<R: Read + Seek>(
        &self,
        reader: &mut R,
        filename: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let document = extract_document(reader, filename)?;
        debug!(
            "Extracted {} chars from {:?} document",
            document.raw_text.chars().count(),
            document.source_format
        );
        Ok(self.analyze_text(&document.raw_text))
    }

    /// Analysis of already-extracted text. Matching and estimation always run
    /// on the full text; only the stored preview is truncated.
    pub fn analyze_text(&self, raw_text: &str) -> AnalysisResult {
        let text_lower = raw_text.to_lowercase();

        let found_skills = match_skills(&text_lower, &self.taxonomy);
        let gaps = recommend_gaps(&found_skills, &self.recommendations);
        let experience_level = estimate_experience(&text_lower);

        debug!(
            "Matched {} skills, {} gaps, experience {}",
            found_skills.len(),
            gaps.len(),
            experience_level.as_str()
        );

        aggregate(raw_text, found_skills, gaps, experience_level)
    }

    /// Runs `analyze` on the blocking pool so PDF parsing never stalls the
    /// async executor. A panicked or cancelled task surfaces as `Internal`.
    pub async fn analyze_bytes(
        self: Arc<Self>,
        bytes: Bytes,
        filename: String,
    ) -> Result<AnalysisResult, AnalysisError> {
        tokio::task::spawn_blocking(move || self.analyze(&mut Cursor::new(bytes), &filename))
            .await
            .map_err(|e| AnalysisError::Internal(format!("analysis task failed: {e}")))?
    }
}
