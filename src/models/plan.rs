//! Planned project structure: ordered file list plus per-file descriptions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File list and descriptions produced by the structure planner.
///
/// Paths are unique and keep the planner's ordering; description keys are
/// always a subset of the planned paths. Description updates merge per key
/// rather than replacing the whole map, so partial updates never lose
/// previously planned entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectPlan {
    files: Vec<String>,
    descriptions: BTreeMap<String, String>,
}

impl ProjectPlan {
    /// Build a plan from raw planner output.
    ///
    /// Duplicate paths are deduplicated by insertion order; the first
    /// description for a path wins. Descriptions for unknown paths are
    /// dropped.
    pub fn new(files: Vec<String>, descriptions: BTreeMap<String, String>) -> Self {
        let mut plan = Self::default();
        for file in files {
            if file.is_empty() || plan.files.contains(&file) {
                continue;
            }
            if let Some(desc) = descriptions.get(&file) {
                plan.descriptions.insert(file.clone(), desc.clone());
            }
            plan.files.push(file);
        }
        plan
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn descriptions(&self) -> &BTreeMap<String, String> {
        &self.descriptions
    }

    pub fn description(&self, path: &str) -> Option<&str> {
        self.descriptions.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Merge description updates key-by-key. Last writer wins per key;
    /// entries for paths outside the plan are ignored.
    pub fn merge_descriptions(&mut self, updates: BTreeMap<String, String>) {
        for (path, desc) in updates {
            if self.contains(&path) {
                self.descriptions.insert(path, desc);
            }
        }
    }

    /// Module stems of the planned files (e.g. `models/user.py` → `user`).
    /// Used to tell local imports apart from external dependencies.
    pub fn module_stems(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|f| {
                std::path::Path::new(f)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_dedup_keeps_insertion_order_first_description_wins() {
        let plan = ProjectPlan::new(
            vec![
                "main.py".to_string(),
                "models/user.py".to_string(),
                "main.py".to_string(),
            ],
            desc(&[("main.py", "entrypoint"), ("models/user.py", "user model")]),
        );

        assert_eq!(plan.files(), &["main.py", "models/user.py"]);
        assert_eq!(plan.description("main.py"), Some("entrypoint"));
    }

    #[test]
    fn test_empty_paths_dropped() {
        let plan = ProjectPlan::new(
            vec!["".to_string(), "app.py".to_string()],
            BTreeMap::new(),
        );
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_descriptions_restricted_to_planned_files() {
        let plan = ProjectPlan::new(
            vec!["a.py".to_string()],
            desc(&[("a.py", "a"), ("ghost.py", "never planned")]),
        );
        assert!(plan.description("ghost.py").is_none());
    }

    #[test]
    fn test_merge_never_loses_existing_keys() {
        let mut plan = ProjectPlan::new(
            vec!["a.py".to_string(), "b.py".to_string()],
            desc(&[("a.py", "x")]),
        );

        plan.merge_descriptions(desc(&[("b.py", "y")]));

        assert_eq!(plan.description("a.py"), Some("x"));
        assert_eq!(plan.description("b.py"), Some("y"));
    }

    #[test]
    fn test_merge_last_writer_wins_per_key() {
        let mut plan = ProjectPlan::new(vec!["a.py".to_string()], desc(&[("a.py", "old")]));
        plan.merge_descriptions(desc(&[("a.py", "new")]));
        assert_eq!(plan.description("a.py"), Some("new"));
    }

    #[test]
    fn test_module_stems() {
        let plan = ProjectPlan::new(
            vec!["models/user.py".to_string(), "main.py".to_string()],
            BTreeMap::new(),
        );
        let stems = plan.module_stems();
        assert!(stems.contains(&"user".to_string()));
        assert!(stems.contains(&"main".to_string()));
    }
}
