//! StateManager - STATE.yaml persistence for the workflow record.
//!
//! The state file lives inside the artifact root so it ships alongside the
//! generated project, and saving happens at stage boundaries so an aborted
//! run leaves a consistent snapshot.

use crate::models::{ProjectPlan, WorkflowPhase, WorkflowState};
use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "STATE.yaml";

/// Content checksum in the `sha256:<hex>` form recorded in state.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Manager for one workflow invocation's persisted state.
pub struct StateManager {
    root_dir: PathBuf,
    state: WorkflowState,
    dirty: bool,
}

impl StateManager {
    /// Start a fresh state record for a new invocation.
    pub fn create(root_dir: impl Into<PathBuf>, requirements_text: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            state: WorkflowState::new(requirements_text),
            dirty: true,
        }
    }

    /// Load the state of a previous or in-flight invocation.
    pub fn load(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let state_path = root_dir.join(STATE_FILE);

        let content = std::fs::read_to_string(&state_path)
            .with_context(|| format!("Failed to read {}", state_path.display()))?;
        let state = serde_yaml::from_str(&content).context("Failed to parse STATE.yaml")?;

        Ok(Self {
            root_dir,
            state,
            dirty: false,
        })
    }

    /// Save state to STATE.yaml.
    pub fn save(&mut self) -> Result<()> {
        self.state.updated_at = Some(Utc::now());

        std::fs::create_dir_all(&self.root_dir)
            .with_context(|| format!("Failed to create {}", self.root_dir.display()))?;

        let state_path = self.root_dir.join(STATE_FILE);
        let content = serde_yaml::to_string(&self.state).context("Failed to serialize state")?;
        std::fs::write(&state_path, content).context("Failed to write STATE.yaml")?;

        self.dirty = false;
        Ok(())
    }

    pub fn save_if_dirty(&mut self) -> Result<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    // =========================================================================
    // Phase and counters
    // =========================================================================

    pub fn set_phase(&mut self, phase: WorkflowPhase) {
        self.state.phase = phase;
        self.dirty = true;
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase
    }

    pub fn increment_improvement(&mut self) -> u32 {
        self.state.improvement_count += 1;
        self.dirty = true;
        self.state.improvement_count
    }

    // =========================================================================
    // Stage results
    // =========================================================================

    pub fn record_plan(&mut self, plan: &ProjectPlan) {
        self.state.record_plan(plan);
        self.dirty = true;
    }

    pub fn set_review_feedback(&mut self, feedback: BTreeMap<String, String>) {
        self.state.set_review_feedback(feedback);
        self.dirty = true;
    }

    pub fn record_execution_pass(&mut self, failures: BTreeMap<String, String>) {
        self.state.record_execution_pass(failures);
        self.dirty = true;
    }

    pub fn record_generation_failure(&mut self, path: &str) {
        if !self.state.generation_failures.iter().any(|p| p == path) {
            self.state.generation_failures.push(path.to_string());
            self.dirty = true;
        }
    }

    pub fn clear_generation_failure(&mut self, path: &str) {
        self.state.generation_failures.retain(|p| p != path);
        self.dirty = true;
    }

    pub fn set_archive_path(&mut self, path: impl Into<PathBuf>) {
        self.state.output_archive_path = Some(path.into());
        self.dirty = true;
    }

    // =========================================================================
    // Content checksums
    // =========================================================================

    /// Record the checksum of content as last written by the workflow.
    pub fn update_checksum(&mut self, path: &str, content: &str) {
        self.state
            .checksums
            .insert(path.to_string(), calculate_checksum(content));
        self.dirty = true;
    }

    /// Whether on-disk content differs from what the workflow last wrote,
    /// e.g. after manual edits during a checkpoint suspension.
    pub fn is_externally_modified(&self, path: &str, content: &str) -> bool {
        match self.state.checksums.get(path) {
            Some(recorded) => *recorded != calculate_checksum(content),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_plan() -> ProjectPlan {
        let mut descriptions = BTreeMap::new();
        descriptions.insert("main.py".to_string(), "entrypoint".to_string());
        ProjectPlan::new(vec!["main.py".to_string()], descriptions)
    }

    #[test]
    fn test_create_save_and_load() {
        let temp = TempDir::new().unwrap();

        let run_id = {
            let mut manager = StateManager::create(temp.path(), "build an api");
            manager.record_plan(&sample_plan());
            manager.set_phase(WorkflowPhase::Writing);
            manager.save().unwrap();
            manager.state().run_id
        };

        let manager = StateManager::load(temp.path()).unwrap();
        assert_eq!(manager.state().run_id, run_id);
        assert_eq!(manager.phase(), WorkflowPhase::Writing);
        assert_eq!(manager.state().planned_files, vec!["main.py".to_string()]);
    }

    #[test]
    fn test_load_missing_state_fails() {
        let temp = TempDir::new().unwrap();
        assert!(StateManager::load(temp.path()).is_err());
    }

    #[test]
    fn test_save_if_dirty_only_writes_when_dirty() {
        let temp = TempDir::new().unwrap();

        let mut manager = StateManager::create(temp.path(), "req");
        manager.save().unwrap();
        assert!(temp.path().join("STATE.yaml").exists());

        std::fs::remove_file(temp.path().join("STATE.yaml")).unwrap();
        manager.save_if_dirty().unwrap();
        assert!(!temp.path().join("STATE.yaml").exists());

        manager.set_phase(WorkflowPhase::Reviewing);
        manager.save_if_dirty().unwrap();
        assert!(temp.path().join("STATE.yaml").exists());
    }

    #[test]
    fn test_checksum_detects_external_modification() {
        let temp = TempDir::new().unwrap();
        let mut manager = StateManager::create(temp.path(), "req");

        manager.update_checksum("main.py", "print('v1')\n");
        assert!(!manager.is_externally_modified("main.py", "print('v1')\n"));
        assert!(manager.is_externally_modified("main.py", "print('edited')\n"));
        assert!(!manager.is_externally_modified("never_written.py", "anything"));
    }

    #[test]
    fn test_checksum_format() {
        assert!(calculate_checksum("hello").starts_with("sha256:"));
        assert_eq!(calculate_checksum("x"), calculate_checksum("x"));
        assert_ne!(calculate_checksum("x"), calculate_checksum("y"));
    }

    #[test]
    fn test_generation_failures_tracked_without_duplicates() {
        let temp = TempDir::new().unwrap();
        let mut manager = StateManager::create(temp.path(), "req");

        manager.record_generation_failure("a.py");
        manager.record_generation_failure("a.py");
        assert_eq!(manager.state().generation_failures.len(), 1);

        manager.clear_generation_failure("a.py");
        assert!(manager.state().generation_failures.is_empty());
    }
}
