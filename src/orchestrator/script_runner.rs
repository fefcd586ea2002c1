//! Child-process runner for the generation CLI.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Runs the configured generation CLI, piping the prompt to stdin and
/// collecting stdout as the response.
#[derive(Default)]
pub struct GenerationRunner {}

impl GenerationRunner {
    pub fn new() -> Self {
        Self {}
    }

    /// Spawn `command` with `args`, write `prompt` to its stdin, and return
    /// its stdout. stdout and stderr are drained concurrently to avoid
    /// backpressure deadlock on chatty generators.
    pub async fn run(
        &self,
        command: &str,
        args: &[String],
        prompt: &str,
        show_progress: bool,
    ) -> Result<String> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let progress = if show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            pb.set_message(format!("Running {}...", command));
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "Command '{}' not found. Please ensure it is installed and in your PATH.",
                command
            )
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .context("Failed to write prompt to stdin")?;
            stdin.flush().await.context("Failed to flush stdin")?;
            drop(stdin);
        }

        let stdout = child.stdout.take().context("Failed to capture stdout")?;
        let stderr = child.stderr.take().context("Failed to capture stderr")?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        let mut output = String::new();
        let mut stderr_output = String::new();
        let mut stdout_done = false;
        let mut stderr_done = false;

        while !stdout_done || !stderr_done {
            tokio::select! {
                line = stdout_reader.next_line(), if !stdout_done => {
                    match line {
                        Ok(Some(line)) => {
                            output.push_str(&line);
                            output.push('\n');

                            if let Some(ref pb) = progress {
                                let short_line = if line.chars().count() > 60 {
                                    let truncated: String = line.chars().take(60).collect();
                                    format!("{}...", truncated)
                                } else {
                                    line.clone()
                                };
                                pb.set_message(short_line);
                            }
                        }
                        Ok(None) => stdout_done = true,
                        Err(e) => return Err(anyhow::anyhow!("Failed to read stdout: {}", e)),
                    }
                }
                line = stderr_reader.next_line(), if !stderr_done => {
                    match line {
                        Ok(Some(line)) => {
                            stderr_output.push_str(&line);
                            stderr_output.push('\n');
                        }
                        Ok(None) => stderr_done = true,
                        Err(e) => return Err(anyhow::anyhow!("Failed to read stderr: {}", e)),
                    }
                }
            }
        }

        let status = child.wait().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if !status.success() {
            anyhow::bail!(
                "Command '{}' failed with exit code {:?}\nStderr: {}",
                command,
                status.code(),
                stderr_output
            );
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_command_reports_not_found() {
        let runner = GenerationRunner::new();
        let result = runner
            .run("codeforge-no-such-binary", &[], "prompt", false)
            .await;

        let err = result.unwrap_err();
        assert!(
            err.to_string().contains("not found"),
            "unexpected error: {}",
            err
        );
    }

    #[tokio::test]
    async fn test_captures_stdout_of_real_command() {
        let runner = GenerationRunner::new();
        // `cat` echoes the prompt back, standing in for a generator CLI.
        let result = runner.run("cat", &[], "echoed prompt", false).await;

        if let Ok(output) = result {
            assert_eq!(output.trim(), "echoed prompt");
        }
    }
}
