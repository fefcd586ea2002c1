pub mod checkpoint;
pub mod engine;
pub mod executor;
pub mod packager;

pub use checkpoint::{AutoApprove, CheckpointDecision, CheckpointPolicy, InteractiveCheckpoint, ScriptedCheckpoint};
pub use engine::{WorkflowEngine, WorkflowOptions};
pub use executor::{ExecOutcome, Executor, ProcessExecutor};
pub use packager::package;
