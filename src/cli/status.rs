//! `codeforge status` - show the persisted state of a workflow run.

use crate::models::ForgeConfig;
use crate::state::StateManager;
use crate::{Context, Result};
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};

pub fn run(root: Option<&Path>, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let config = ForgeConfig::load(&project_root)?;
    let root_path: PathBuf = root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.root_path.clone());

    let manager = StateManager::load(&root_path)
        .with_context(|| format!("No workflow state found under {}", root_path.display()))?;
    let state = manager.state();

    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        state.phase.emoji(),
        state.phase.name().bold(),
        format!("(run {})", state.run_id).bright_black()
    );
    println!("   Planned files:      {}", state.planned_files.len());
    println!("   Improvement cycles: {}", state.improvement_count);
    println!("   Execution passes:   {}", state.retry_count);

    if state.generation_failures.is_empty() {
        println!("   Generation:         {}", "all files written".green());
    } else {
        println!(
            "   Generation:         {}",
            format!("{} file(s) left as placeholder", state.generation_failures.len()).yellow()
        );
    }

    if state.last_error_log.is_none() {
        println!("   Last run:           {}", "clean".green());
    } else {
        println!("   Last run:           {}", "failing".red());
        for (path, detail) in &state.error_log {
            println!(
                "     {} {}: {}",
                "✗".red(),
                path,
                detail.lines().next().unwrap_or("")
            );
        }
    }

    match &state.output_archive_path {
        Some(path) => println!("   Archive:            {}", path.display()),
        None => println!("   Archive:            not packaged yet"),
    }

    Ok(())
}
