//! The generation workflow: a bounded pipeline that plans a project,
//! writes and reviews its files, self-corrects on execution failures, and
//! packages the result.
//!
//! Stage order: plan → materialize → write → review-improve →
//! test generation → execution loop → final run → package. The execution
//! loop re-enters review-improve with error-informed critiques until a pass
//! is clean or the retry budget is spent, then ships best effort.

use super::checkpoint::{CheckpointDecision, CheckpointPolicy};
use super::executor::Executor;
use super::packager;
use crate::error::WorkflowError;
use crate::models::{ProjectPlan, RunnerConfig, WorkflowConfig, WorkflowPhase};
use crate::orchestrator::{generate_with_retry, prompts, Generator};
use crate::state::StateManager;
use crate::store::ArtifactStore;
use crate::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loop budgets for one invocation.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Execution passes before degrading to best-effort delivery. At least 1.
    pub max_retries: u32,
    /// Review-improve iterations between writing and test generation.
    pub review_iterations: u32,
    /// Transient-failure retries per generation call.
    pub generation_retries: u32,
    pub retry_delay: Duration,
}

impl From<&WorkflowConfig> for WorkflowOptions {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            review_iterations: config.review_iterations,
            generation_retries: config.generation_retries,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// Orchestrates one workflow invocation. Collaborators are injected so the
/// whole pipeline runs deterministically under test fakes.
pub struct WorkflowEngine<'a> {
    generator: &'a dyn Generator,
    executor: &'a dyn Executor,
    checkpoint: &'a dyn CheckpointPolicy,
    runner: RunnerConfig,
    options: WorkflowOptions,
}

impl<'a> WorkflowEngine<'a> {
    pub fn new(
        generator: &'a dyn Generator,
        executor: &'a dyn Executor,
        checkpoint: &'a dyn CheckpointPolicy,
        runner: RunnerConfig,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            generator,
            executor,
            checkpoint,
            runner,
            options,
        }
    }

    /// Run the full pipeline and return the archive path.
    pub async fn run(&self, requirements_text: &str, root_path: &Path) -> Result<PathBuf> {
        let store = ArtifactStore::new(root_path);
        let mut state = StateManager::create(root_path, requirements_text);

        // Planning: one generation call, fatal if no structured payload.
        println!("{}", "🗺️  Planning project structure...".cyan());
        let plan = self.plan(requirements_text).await?;
        state.record_plan(&plan);
        println!(
            "{}",
            format!("   {} files planned", plan.len()).green()
        );

        // Scaffolding
        store.materialize(&plan)?;
        state.set_phase(WorkflowPhase::Scaffolded);
        state.save()?;

        // Content writing (fail-soft per file)
        println!("{}", "✍️  Writing file contents...".cyan());
        state.set_phase(WorkflowPhase::Writing);
        self.write_all(&store, &plan, &mut state).await;
        store.write_manifest(&plan)?;
        state.save()?;

        // Review-improve before test generation
        for _ in 0..self.options.review_iterations {
            self.review(&store, &plan, &mut state, &BTreeMap::new())
                .await;
            self.improve(&store, &plan, &mut state).await?;
        }
        state.save()?;

        // Test generation precedes the first execution pass.
        println!("{}", "🧪 Generating tests...".cyan());
        state.set_phase(WorkflowPhase::GeneratingTests);
        self.generate_tests(&store, &plan, &mut state).await;
        state.save()?;

        // Execution and error recovery
        state.set_phase(WorkflowPhase::Executing);
        loop {
            println!(
                "{}",
                format!(
                    "🚀 Execution pass {}/{}...",
                    state.state().retry_count + 1,
                    self.options.max_retries
                )
                .cyan()
            );
            let failures = self.run_pass(&store, &plan).await;
            state.record_execution_pass(failures.clone());
            state.save()?;

            if failures.is_empty() {
                println!("{}", "✅ All files executed cleanly".green());
                break;
            }

            if state.state().retry_count >= self.options.max_retries {
                println!(
                    "{}",
                    format!(
                        "⚠️  Retry budget exhausted ({} passes); shipping best effort",
                        state.state().retry_count
                    )
                    .yellow()
                );
                break;
            }

            println!(
                "{}",
                format!("🔄 {} file(s) failed; feeding errors back into review", failures.len())
                    .yellow()
            );
            self.review(&store, &plan, &mut state, &failures).await;
            self.improve(&store, &plan, &mut state).await?;
            state.save()?;
        }

        // Final execution: one unconditional pass, outcome tolerated.
        println!("{}", "🏁 Final execution pass...".cyan());
        state.set_phase(WorkflowPhase::FinalRun);
        state.save()?;
        self.final_run(&store, &plan).await;

        // Packaging
        println!("{}", "📦 Packaging artifacts...".cyan());
        let archive = packager::package(store.root())?;
        state.set_archive_path(&archive);
        state.set_phase(WorkflowPhase::Packaged);
        state.save()?;

        println!(
            "{}",
            format!("✨ Done: {}", archive.display()).green().bold()
        );
        Ok(archive)
    }

    async fn plan(&self, requirements_text: &str) -> Result<ProjectPlan> {
        let prompt = prompts::plan_prompt(requirements_text);
        let response = generate_with_retry(
            self.generator,
            &prompt,
            self.options.generation_retries,
            self.options.retry_delay,
        )
        .await?;

        let plan = crate::parser::parse_plan(&response)?;
        Ok(plan)
    }

    /// One generation call per planned file, scoped to its description.
    /// A failed call leaves the placeholder in place and the sequence
    /// continues.
    async fn write_all(&self, store: &ArtifactStore, plan: &ProjectPlan, state: &mut StateManager) {
        for path in plan.files() {
            let description = plan.description(path).unwrap_or("No description available");
            let prompt = prompts::write_file_prompt(path, description);

            match self.generate_file_content(path, &prompt).await {
                Ok(content) => {
                    if let Err(e) = store.write(path, &content) {
                        println!("{}", format!("⚠️  {}: {}", path, e).yellow());
                        state.record_generation_failure(path);
                        continue;
                    }
                    state.update_checksum(path, &content);
                    state.clear_generation_failure(path);
                    println!("   {} {}", "✓".green(), path);
                }
                Err(e) => {
                    println!("{}", format!("⚠️  {}", e).yellow());
                    state.record_generation_failure(path);
                }
            }
        }
    }

    /// Critique every planned file; feedback replaces the previous map
    /// wholesale. When an execution failure is known for a file, its error
    /// output steers the critique.
    async fn review(
        &self,
        store: &ArtifactStore,
        plan: &ProjectPlan,
        state: &mut StateManager,
        execution_errors: &BTreeMap<String, String>,
    ) {
        println!("{}", "🔍 Reviewing code...".cyan());
        state.set_phase(WorkflowPhase::Reviewing);

        let mut feedback = BTreeMap::new();
        for path in plan.files() {
            let content = match store.read(path) {
                Ok(content) => content,
                Err(e) => {
                    println!("{}", format!("⚠️  {}", e).yellow());
                    continue;
                }
            };

            let prompt =
                prompts::review_prompt(path, &content, execution_errors.get(path).map(String::as_str));
            match generate_with_retry(
                self.generator,
                &prompt,
                self.options.generation_retries,
                self.options.retry_delay,
            )
            .await
            {
                Ok(response) => {
                    feedback.insert(path.clone(), response.trim().to_string());
                }
                Err(e) => {
                    // Critique failure for one file never halts the pass.
                    println!(
                        "{}",
                        format!("⚠️  review failed for {}: {}", path, e).yellow()
                    );
                }
            }
        }

        state.set_review_feedback(feedback);
    }

    /// Apply review feedback file by file, behind the checkpoint policy.
    /// A rejection means the operator edited the tree manually; the new
    /// content is adopted (re-checksummed) without any generation call.
    async fn improve(
        &self,
        store: &ArtifactStore,
        plan: &ProjectPlan,
        state: &mut StateManager,
    ) -> Result<()> {
        state.set_phase(WorkflowPhase::Improving);
        let iteration = state.increment_improvement();

        match self.checkpoint.review(iteration)? {
            CheckpointDecision::RevisedManually => {
                println!("{}", "📝 Adopting manual edits".yellow());
                for path in plan.files() {
                    if let Ok(content) = store.read(path) {
                        if state.is_externally_modified(path, &content) {
                            state.update_checksum(path, &content);
                        }
                    }
                }
                return Ok(());
            }
            CheckpointDecision::Approved => {}
        }

        println!("{}", "🔧 Improving code from feedback...".cyan());
        let feedback = state.state().review_feedback.clone();
        for (path, notes) in feedback {
            let content = match store.read(&path) {
                Ok(content) => content,
                Err(e) => {
                    println!("{}", format!("⚠️  {}", e).yellow());
                    continue;
                }
            };

            let prompt = prompts::improve_prompt(&path, &content, &notes);
            match self.generate_file_content(&path, &prompt).await {
                Ok(improved) => {
                    store.write(&path, &improved)?;
                    state.update_checksum(&path, &improved);
                    // A successful rewrite heals a file whose original
                    // generation call failed.
                    state.clear_generation_failure(&path);
                    println!("   {} {}", "✓".green(), path);
                }
                Err(e) => {
                    // File keeps its prior content.
                    println!("{}", format!("⚠️  {}", e).yellow());
                }
            }
        }

        Ok(())
    }

    /// One generated test file per runnable source file.
    async fn generate_tests(
        &self,
        store: &ArtifactStore,
        plan: &ProjectPlan,
        state: &mut StateManager,
    ) {
        for path in plan.files() {
            if !self.runner.is_executable(path) {
                continue;
            }
            let content = match store.read(path) {
                Ok(content) => content,
                Err(_) => continue,
            };

            let prompt = prompts::test_prompt(path, &content);
            match self.generate_file_content(path, &prompt).await {
                Ok(test_code) => {
                    let test_path = store.test_path(path);
                    if let Err(e) = store.write(&test_path, &test_code) {
                        println!("{}", format!("⚠️  {}: {}", test_path, e).yellow());
                        continue;
                    }
                    state.update_checksum(&test_path, &test_code);
                    println!("   {} {}", "✓".green(), test_path);
                }
                Err(e) => {
                    println!("{}", format!("⚠️  {}", e).yellow());
                }
            }
        }
    }

    /// Execute every runnable file in planner order, collecting per-file
    /// failures. Spawn errors count as that file's failure.
    async fn run_pass(&self, store: &ArtifactStore, plan: &ProjectPlan) -> BTreeMap<String, String> {
        let mut failures = BTreeMap::new();

        for path in plan.files() {
            if !self.runner.is_executable(path) {
                continue;
            }

            match self.executor.execute(&store.full_path(path)).await {
                Ok(outcome) if outcome.success() => {
                    println!("   {} {}", "✓".green(), path);
                }
                Ok(outcome) => {
                    let error = outcome.error_text();
                    println!("   {} {}: {}", "✗".red(), path, error.lines().next().unwrap_or(""));
                    failures.insert(path.clone(), error);
                }
                Err(e) => {
                    println!("   {} {}: {}", "✗".red(), path, e);
                    failures.insert(path.clone(), e.to_string());
                }
            }
        }

        failures
    }

    /// Unconditional last pass; outcomes are reported but never fed back.
    async fn final_run(&self, store: &ArtifactStore, plan: &ProjectPlan) {
        for path in plan.files() {
            if !self.runner.is_executable(path) {
                continue;
            }
            match self.executor.execute(&store.full_path(path)).await {
                Ok(outcome) if outcome.success() => {
                    println!("   {} {}", "✓".green(), path);
                }
                Ok(outcome) => {
                    println!(
                        "   {} {} ({})",
                        "✗".yellow(),
                        path,
                        outcome.error_text().lines().next().unwrap_or("")
                    );
                }
                Err(e) => {
                    println!("   {} {} ({})", "✗".yellow(), path, e);
                }
            }
        }
    }

    /// Run one content-producing generation call and sanitize the result.
    /// Empty output after sanitization counts as a failed call.
    async fn generate_file_content(&self, path: &str, prompt: &str) -> Result<String, WorkflowError> {
        let response = generate_with_retry(
            self.generator,
            prompt,
            self.options.generation_retries,
            self.options.retry_delay,
        )
        .await
        .map_err(|e| WorkflowError::generation(path, e.to_string()))?;

        let content = crate::parser::sanitize_generated(&response);
        if content.is_empty() {
            return Err(WorkflowError::generation(path, "returned unusable content"));
        }
        Ok(content)
    }
}
