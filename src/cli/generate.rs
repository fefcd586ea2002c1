//! `codeforge generate` - run the full workflow from a requirements file.

use crate::models::ForgeConfig;
use crate::orchestrator::CliGenerator;
use crate::workflow::{
    AutoApprove, CheckpointPolicy, InteractiveCheckpoint, ProcessExecutor, WorkflowEngine,
};
use crate::{Context, Result};
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};

pub async fn run(requirements: Option<&Path>, root: Option<&Path>, yes: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let config = ForgeConfig::load(&project_root)?;

    let requirements_path: PathBuf = requirements
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.requirements_file.clone());
    let requirements_text = std::fs::read_to_string(&requirements_path).with_context(|| {
        format!(
            "Failed to read requirements from {}. Upload a document or pass a file.",
            requirements_path.display()
        )
    })?;

    let root_path: PathBuf = root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.root_path.clone());

    println!(
        "{}",
        format!(
            "🤖 Generating project at {} from {}",
            root_path.display(),
            requirements_path.display()
        )
        .cyan()
    );

    let generator = CliGenerator::new(&config.generator);
    let executor = ProcessExecutor::new(&config.runner);
    let checkpoint: Box<dyn CheckpointPolicy> = if config.workflow.human_checkpoint && !yes {
        Box::new(InteractiveCheckpoint)
    } else {
        Box::new(AutoApprove)
    };

    let engine = WorkflowEngine::new(
        &generator,
        &executor,
        checkpoint.as_ref(),
        config.runner.clone(),
        (&config.workflow).into(),
    );

    let archive = engine.run(&requirements_text, &root_path).await?;

    println!();
    println!("{}", "✅ Project generated and packaged!".green().bold());
    println!("   Archive: {}", archive.display());
    println!("   Serve it with: codeforge serve");

    Ok(())
}
