use thiserror::Error;

/// Failure modes of the resume analysis pipeline.
///
/// The pipeline is atomic: a caller either gets a complete `AnalysisResult`
/// or exactly one of these.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The filename suffix is not one of pdf, docx, doc or txt.
    #[error("Unsupported file type: {filename}")]
    UnsupportedFormat { filename: String },

    /// The format-specific reader could not make sense of the document.
    #[error("Failed to extract {format} text: {reason}")]
    Extraction { format: &'static str, reason: String },

    #[error("Resume analysis failed: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// True when the input itself is at fault and retrying with the same
    /// bytes cannot succeed.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnsupportedFormat { .. } | AnalysisError::Extraction { .. }
        )
    }

    pub(crate) fn extraction(format: &'static str, reason: impl ToString) -> Self {
        AnalysisError::Extraction {
            format,
            reason: reason.to_string(),
        }
    }
}
