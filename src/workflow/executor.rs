//! Execution of generated files through the configured runner.

use crate::models::RunnerConfig;
use crate::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured outcome of one file execution.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Error text recorded in the workflow's error log.
    pub fn error_text(&self) -> String {
        if self.timed_out {
            return "execution timed out".to_string();
        }
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exited with code {:?}", self.exit_code)
        } else {
            stderr.to_string()
        }
    }
}

/// Process-runner boundary: executes one file in an isolated process.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, path: &Path) -> Result<ExecOutcome>;
}

/// Runs files with the configured interpreter, bounded by a timeout so a
/// generated server or infinite loop cannot hang the workflow.
pub struct ProcessExecutor {
    command: String,
    timeout: Duration,
}

impl ProcessExecutor {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, path: &Path) -> Result<ExecOutcome> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn '{}' for {}", self.command, path.display()))?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output.context("Failed to collect process output")?;
                Ok(ExecOutcome {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    timed_out: false,
                })
            }
            // The dropped child is killed via kill_on_drop.
            Err(_) => Ok(ExecOutcome {
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn runner(command: &str, timeout_secs: u64) -> ProcessExecutor {
        ProcessExecutor::new(&RunnerConfig {
            command: command.to_string(),
            extensions: vec!["sh".to_string()],
            timeout_secs,
        })
    }

    #[tokio::test]
    async fn test_successful_run_captures_stdout() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("ok.sh");
        let mut file = std::fs::File::create(&script).unwrap();
        writeln!(file, "echo hello").unwrap();

        let outcome = runner("sh", 10).execute(&script).await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_failing_run_reports_stderr() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("bad.sh");
        let mut file = std::fs::File::create(&script).unwrap();
        writeln!(file, "echo broken >&2; exit 3").unwrap();

        let outcome = runner("sh", 10).execute(&script).await.unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.error_text(), "broken");
    }

    #[tokio::test]
    async fn test_timeout_is_reported_not_hung() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("slow.sh");
        let mut file = std::fs::File::create(&script).unwrap();
        writeln!(file, "sleep 30").unwrap();

        let outcome = runner("sh", 1).execute(&script).await.unwrap();
        assert!(outcome.timed_out);
        assert!(!outcome.success());
        assert_eq!(outcome.error_text(), "execution timed out");
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_an_error() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("x.sh");
        std::fs::write(&script, "exit 0\n").unwrap();

        let result = runner("codeforge-no-such-interpreter", 5)
            .execute(&script)
            .await;
        assert!(result.is_err());
    }
}
