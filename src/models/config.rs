//! Configuration loaded from codeforge.toml.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_root_path() -> PathBuf {
    PathBuf::from("generated_project_root")
}

fn default_requirements_file() -> PathBuf {
    PathBuf::from("extracted_text.txt")
}

fn default_max_retries() -> u32 {
    3
}

fn default_review_iterations() -> u32 {
    1
}

fn default_human_checkpoint() -> bool {
    true
}

fn default_generation_retries() -> u32 {
    1
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_generator_command() -> String {
    "claude".to_string()
}

fn default_generator_args() -> Vec<String> {
    vec!["--print".to_string()]
}

fn default_runner_command() -> String {
    "python3".to_string()
}

fn default_runner_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_runner_timeout_secs() -> u64 {
    120
}

fn default_server_port() -> u16 {
    8000
}

/// Workflow loop budgets and checkpoint policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Execution-retry budget: self-correction passes before shipping best effort
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Review-improve iterations after content writing, before test generation
    #[serde(default = "default_review_iterations")]
    pub review_iterations: u32,

    /// Ask for human acceptance on every improvement iteration
    #[serde(default = "default_human_checkpoint")]
    pub human_checkpoint: bool,

    /// Retries for a transient generation-call failure
    #[serde(default = "default_generation_retries")]
    pub generation_retries: u32,

    /// Delay between generation retries
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            review_iterations: default_review_iterations(),
            human_checkpoint: default_human_checkpoint(),
            generation_retries: default_generation_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

/// Which CLI to invoke for generation calls and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Command name (must be on PATH)
    #[serde(default = "default_generator_command")]
    pub command: String,

    /// Fixed arguments prepended to every invocation
    #[serde(default = "default_generator_args")]
    pub args: Vec<String>,

    /// Optional model override, passed as `--model <id>`
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_generator_command(),
            args: default_generator_args(),
            model: None,
        }
    }
}

/// How generated files are executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Interpreter used to run each generated file
    #[serde(default = "default_runner_command")]
    pub command: String,

    /// File extensions considered executable
    #[serde(default = "default_runner_extensions")]
    pub extensions: Vec<String>,

    /// Per-file execution timeout
    #[serde(default = "default_runner_timeout_secs")]
    pub timeout_secs: u64,
}

impl RunnerConfig {
    /// Whether a planned path should be executed by the runner.
    pub fn is_executable(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: default_runner_command(),
            extensions: default_runner_extensions(),
            timeout_secs: default_runner_timeout_secs(),
        }
    }
}

/// Upload/download server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

/// Codeforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// Directory where generated artifacts materialize
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Where extracted requirements text is persisted between upload and generate
    #[serde(default = "default_requirements_file")]
    pub requirements_file: PathBuf,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            requirements_file: default_requirements_file(),
            workflow: WorkflowConfig::default(),
            generator: GeneratorConfig::default(),
            runner: RunnerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl ForgeConfig {
    /// Load config from codeforge.toml, falling back to defaults when absent.
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let config_path = project_root.join("codeforge.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: ForgeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to codeforge.toml.
    pub fn save(&self, project_root: &Path) -> anyhow::Result<()> {
        let config_path = project_root.join("codeforge.toml");
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ForgeConfig::default();
        assert_eq!(config.workflow.max_retries, 3);
        assert!(config.workflow.human_checkpoint);
        assert_eq!(config.runner.command, "python3");
        assert_eq!(config.root_path, PathBuf::from("generated_project_root"));
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ForgeConfig::load(temp.path()).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("codeforge.toml"),
            "[workflow]\nmax_retries = 5\n",
        )
        .unwrap();

        let config = ForgeConfig::load(temp.path()).unwrap();
        assert_eq!(config.workflow.max_retries, 5);
        assert_eq!(config.workflow.review_iterations, 1);
        assert_eq!(config.generator.command, "claude");
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let mut config = ForgeConfig::default();
        config.workflow.human_checkpoint = false;
        config.runner.extensions = vec!["py".to_string(), "sh".to_string()];
        config.save(temp.path()).unwrap();

        let reloaded = ForgeConfig::load(temp.path()).unwrap();
        assert!(!reloaded.workflow.human_checkpoint);
        assert_eq!(reloaded.runner.extensions.len(), 2);
    }

    #[test]
    fn test_runner_executable_filter() {
        let runner = RunnerConfig::default();
        assert!(runner.is_executable("app/main.py"));
        assert!(!runner.is_executable("README.md"));
        assert!(!runner.is_executable("Dockerfile"));
    }
}
