//! The mutable workflow record threaded through every stage.

use crate::models::ProjectPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Stage the workflow is currently in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Planning,
    Scaffolded,
    Writing,
    Reviewing,
    Improving,
    GeneratingTests,
    Executing,
    FinalRun,
    Packaged,
}

impl WorkflowPhase {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowPhase::Planning => "Planning",
            WorkflowPhase::Scaffolded => "Scaffolded",
            WorkflowPhase::Writing => "Writing",
            WorkflowPhase::Reviewing => "Reviewing",
            WorkflowPhase::Improving => "Improving",
            WorkflowPhase::GeneratingTests => "GeneratingTests",
            WorkflowPhase::Executing => "Executing",
            WorkflowPhase::FinalRun => "FinalRun",
            WorkflowPhase::Packaged => "Packaged",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            WorkflowPhase::Planning => "🗺️",
            WorkflowPhase::Scaffolded => "🏗️",
            WorkflowPhase::Writing => "✍️",
            WorkflowPhase::Reviewing => "🔍",
            WorkflowPhase::Improving => "🔧",
            WorkflowPhase::GeneratingTests => "🧪",
            WorkflowPhase::Executing => "🚀",
            WorkflowPhase::FinalRun => "🏁",
            WorkflowPhase::Packaged => "📦",
        }
    }
}

/// Single mutable state record for one workflow invocation.
///
/// Created once from the requirements text, mutated in place by each stage,
/// persisted as STATE.yaml so an aborted run leaves a consistent snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Unique id for this invocation
    pub run_id: Uuid,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    pub phase: WorkflowPhase,

    /// Immutable input
    pub requirements_text: String,

    /// Set once by the planner; each path unique, planner order preserved
    #[serde(default)]
    pub planned_files: Vec<String>,

    /// One entry per planned file; merged per key, never replaced wholesale
    #[serde(default)]
    pub file_descriptions: BTreeMap<String, String>,

    /// Replaced wholesale on each review pass
    #[serde(default)]
    pub review_feedback: BTreeMap<String, String>,

    /// Per-file failures from the most recent execution pass
    #[serde(default)]
    pub error_log: BTreeMap<String, String>,

    /// Rendered summary of `error_log`; absent means the last pass was clean
    #[serde(default)]
    pub last_error_log: Option<String>,

    /// Execution passes consumed
    #[serde(default)]
    pub retry_count: u32,

    /// Review-improve iterations consumed; never reset within a run
    #[serde(default)]
    pub improvement_count: u32,

    /// Files whose generation call failed and were left as placeholders
    #[serde(default)]
    pub generation_failures: Vec<String>,

    /// sha256 of each file's content as last written by the workflow
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,

    /// Set once packaging completes
    #[serde(default)]
    pub output_archive_path: Option<PathBuf>,
}

impl WorkflowState {
    pub fn new(requirements_text: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            phase: WorkflowPhase::Planning,
            requirements_text: requirements_text.into(),
            planned_files: Vec::new(),
            file_descriptions: BTreeMap::new(),
            review_feedback: BTreeMap::new(),
            error_log: BTreeMap::new(),
            last_error_log: None,
            retry_count: 0,
            improvement_count: 0,
            generation_failures: Vec::new(),
            checksums: BTreeMap::new(),
            output_archive_path: None,
        }
    }

    /// Adopt the planner's result. Descriptions merge per key so repeated
    /// planning never loses prior entries.
    pub fn record_plan(&mut self, plan: &ProjectPlan) {
        if self.planned_files.is_empty() {
            self.planned_files = plan.files().to_vec();
        }
        for (path, desc) in plan.descriptions() {
            if self.planned_files.iter().any(|f| f == path) {
                self.file_descriptions.insert(path.clone(), desc.clone());
            }
        }
    }

    /// Replace review feedback wholesale, dropping entries for unplanned paths.
    pub fn set_review_feedback(&mut self, feedback: BTreeMap<String, String>) {
        self.review_feedback = feedback
            .into_iter()
            .filter(|(path, _)| self.planned_files.iter().any(|f| f == path))
            .collect();
    }

    /// Record the outcome of one full execution pass.
    pub fn record_execution_pass(&mut self, failures: BTreeMap<String, String>) {
        self.retry_count += 1;
        if failures.is_empty() {
            self.error_log.clear();
            self.last_error_log = None;
        } else {
            // The last observed failure doubles as the scalar summary.
            self.last_error_log = failures.values().last().cloned();
            self.error_log = failures;
        }
    }

    pub fn last_pass_clean(&self) -> bool {
        self.last_error_log.is_none()
    }
}
