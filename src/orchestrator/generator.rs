//! The generation collaborator boundary.
//!
//! Every stage receives a `Generator` rather than touching a global client,
//! so tests can substitute a scripted fake.

use super::GenerationRunner;
use crate::models::GeneratorConfig;
use crate::Result;
use async_trait::async_trait;
use colored::Colorize;

/// A text-in, text-out generation collaborator. Calls may be slow and may
/// return malformed output; callers own validation and sanitization.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator backed by a CLI tool (prompt piped to stdin).
pub struct CliGenerator {
    config: GeneratorConfig,
    runner: GenerationRunner,
    show_progress: bool,
}

impl CliGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            config: config.clone(),
            runner: GenerationRunner::new(),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = self.config.args.clone();
        if let Some(model) = &self.config.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args
    }
}

#[async_trait]
impl Generator for CliGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.runner
            .run(&self.config.command, &self.build_args(), prompt, self.show_progress)
            .await
    }
}

/// Run one generation call, retrying transient failures.
///
/// Mirrors the orchestration retry discipline: connection, timeout, and
/// non-zero-exit failures are retried after a delay; anything else is
/// returned immediately.
pub async fn generate_with_retry(
    generator: &dyn Generator,
    prompt: &str,
    retries: u32,
    delay: std::time::Duration,
) -> Result<String> {
    let mut last_error = None;

    for attempt in 0..=retries {
        if attempt > 0 {
            println!(
                "{}",
                format!("🔄 Retrying generation (attempt {}/{})", attempt + 1, retries + 1)
                    .yellow()
            );
            tokio::time::sleep(delay).await;
        }

        match generator.generate(prompt).await {
            Ok(output) => return Ok(output),
            Err(e) => {
                let message = e.to_string();
                if message.contains("exit code")
                    || message.contains("connection")
                    || message.contains("timeout")
                {
                    println!("{}", format!("⚠️  Generation failed: {}", message).yellow());
                    last_error = Some(e);
                } else {
                    return Err(e);
                }
            }
        }
    }

    Err(last_error.expect("retry loop exits early unless an error was recorded"))
}
