//! Error taxonomy for the generation workflow.
//!
//! Planning and packaging errors abort the run; per-file generation and
//! execution errors are recorded and the batch continues.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The planner's response contained no recognizable structured payload.
    #[error("no structured payload found in planner response: {reason}")]
    PlanningParse { reason: String },

    /// A single file's generation, critique, or improvement call failed.
    #[error("generation failed for '{path}': {reason}")]
    Generation { path: String, reason: String },

    /// A generated file failed at runtime.
    #[error("execution failed for '{path}': {detail}")]
    Execution { path: String, detail: String },

    /// Requested artifact was never materialized.
    #[error("artifact not found: {path}")]
    NotFound { path: PathBuf },

    /// Archive creation failed; no deliverable exists.
    #[error("packaging failed: {reason}")]
    Packaging { reason: String },

    /// Uploaded document is not a readable .docx container.
    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },
}

impl WorkflowError {
    pub fn planning(reason: impl Into<String>) -> Self {
        Self::PlanningParse {
            reason: reason.into(),
        }
    }

    pub fn generation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Generation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn packaging(reason: impl Into<String>) -> Self {
        Self::Packaging {
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PlanningParse { .. } | Self::Packaging { .. } | Self::InvalidDocument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(WorkflowError::planning("empty").is_fatal());
        assert!(WorkflowError::packaging("disk full").is_fatal());
        assert!(!WorkflowError::generation("app.py", "timeout").is_fatal());
        assert!(!WorkflowError::Execution {
            path: "app.py".to_string(),
            detail: "exit 1".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_display_includes_path() {
        let err = WorkflowError::generation("models/user.py", "malformed output");
        assert!(err.to_string().contains("models/user.py"));
    }
}
