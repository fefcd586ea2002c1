//! ArtifactStore - on-disk representation of the generated project.

use crate::error::WorkflowError;
use crate::models::ProjectPlan;
use crate::parser::extract_import_tokens;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DESCRIPTION_MARKER: &str = "# Description:";
const MANIFEST_FILE: &str = "requirements.txt";
const TESTS_DIR: &str = "tests";

/// File store rooted at the artifact directory. All operations take planned
/// paths relative to the root.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Create parent directories and a description-header placeholder for
    /// every planned file. Idempotent: existing files are left untouched,
    /// directories are only re-ensured.
    pub fn materialize(&self, plan: &ProjectPlan) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create {}", self.root.display()))?;

        for file in plan.files() {
            let full_path = self.full_path(file);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            if !full_path.exists() {
                let description = plan.description(file).unwrap_or("No description available");
                let placeholder = format!("{} {}\n\n", DESCRIPTION_MARKER, description);
                std::fs::write(&full_path, placeholder)
                    .with_context(|| format!("Failed to write {}", full_path.display()))?;
            }
        }

        Ok(())
    }

    /// Overwrite a file's content.
    pub fn write(&self, path: &str, content: &str) -> Result<()> {
        let full_path = self.full_path(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&full_path, content)
            .with_context(|| format!("Failed to write {}", full_path.display()))?;
        Ok(())
    }

    /// Read a file's current content. Paths that were never materialized
    /// fail with `NotFoundError`.
    pub fn read(&self, path: &str) -> Result<String, WorkflowError> {
        let full_path = self.full_path(path);
        std::fs::read_to_string(&full_path).map_err(|_| WorkflowError::NotFound {
            path: full_path,
        })
    }

    /// Whether a file still holds only its materialization placeholder.
    pub fn is_placeholder(&self, path: &str) -> bool {
        match self.read(path) {
            Ok(content) => content.starts_with(DESCRIPTION_MARKER),
            Err(_) => false,
        }
    }

    /// Scan every planned file's import-like statements and write the
    /// dependency manifest. Tokens naming planned modules or directories
    /// are local references, not dependencies, and are skipped.
    pub fn write_manifest(&self, plan: &ProjectPlan) -> Result<PathBuf> {
        let mut local_names: BTreeSet<String> = plan.module_stems().into_iter().collect();
        local_names.insert("main".to_string());
        for file in plan.files() {
            if let Some(first) = Path::new(file).components().next() {
                local_names.insert(first.as_os_str().to_string_lossy().to_string());
            }
        }

        let mut requirements = BTreeSet::new();
        for file in plan.files() {
            let Ok(content) = self.read(file) else {
                continue;
            };
            for token in extract_import_tokens(&content) {
                if !local_names.contains(&token) {
                    requirements.insert(token);
                }
            }
        }

        let manifest_path = self.root.join(MANIFEST_FILE);
        let mut body = requirements.into_iter().collect::<Vec<_>>().join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        std::fs::write(&manifest_path, body)
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

        Ok(manifest_path)
    }

    /// Relative path of the generated test file for a source file.
    pub fn test_path(&self, source_path: &str) -> String {
        let basename = Path::new(source_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source_path.to_string());
        format!("{}/test_{}", TESTS_DIR, basename)
    }
}
