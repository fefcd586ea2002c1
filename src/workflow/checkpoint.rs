//! Human-in-the-loop checkpoint between review and improvement.
//!
//! The decision source is injected so automated contexts never block on a
//! terminal read: the CLI uses the interactive policy, the server and tests
//! use auto-approve or a scripted queue.

use crate::Result;
use colored::Colorize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Outcome of one checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointDecision {
    /// Proceed with improvement-generation calls.
    Approved,
    /// The operator edited the code manually; resume without regenerating.
    RevisedManually,
}

/// Decision source consulted at the start of every improvement iteration.
pub trait CheckpointPolicy: Send + Sync {
    fn review(&self, iteration: u32) -> Result<CheckpointDecision>;
}

/// Always proceeds. Used when the checkpoint is disabled and in server mode.
pub struct AutoApprove;

impl CheckpointPolicy for AutoApprove {
    fn review(&self, _iteration: u32) -> Result<CheckpointDecision> {
        Ok(CheckpointDecision::Approved)
    }
}

/// Terminal prompt: accept the generated code, or pause for manual edits.
pub struct InteractiveCheckpoint;

impl CheckpointPolicy for InteractiveCheckpoint {
    fn review(&self, iteration: u32) -> Result<CheckpointDecision> {
        println!();
        let accepted = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Are you OK with the generated code (iteration {})?",
                iteration
            ))
            .default(true)
            .interact()?;

        if accepted {
            return Ok(CheckpointDecision::Approved);
        }

        println!(
            "{}",
            "📝 [Manual Review] Edit the code, then confirm to continue.".yellow()
        );
        dialoguer::Confirm::new()
            .with_prompt("Done editing?")
            .default(true)
            .interact()?;

        Ok(CheckpointDecision::RevisedManually)
    }
}

/// Queued decisions for deterministic tests. Once the queue drains, every
/// further checkpoint approves.
pub struct ScriptedCheckpoint {
    decisions: Mutex<VecDeque<CheckpointDecision>>,
}

impl ScriptedCheckpoint {
    pub fn new(decisions: impl IntoIterator<Item = CheckpointDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
        }
    }
}

impl CheckpointPolicy for ScriptedCheckpoint {
    fn review(&self, _iteration: u32) -> Result<CheckpointDecision> {
        let mut queue = self.decisions.lock().expect("checkpoint queue poisoned");
        Ok(queue.pop_front().unwrap_or(CheckpointDecision::Approved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_approve_always_approves() {
        for iteration in 1..5 {
            assert_eq!(
                AutoApprove.review(iteration).unwrap(),
                CheckpointDecision::Approved
            );
        }
    }

    #[test]
    fn test_scripted_checkpoint_replays_then_approves() {
        let policy = ScriptedCheckpoint::new([
            CheckpointDecision::RevisedManually,
            CheckpointDecision::Approved,
        ]);

        assert_eq!(
            policy.review(1).unwrap(),
            CheckpointDecision::RevisedManually
        );
        assert_eq!(policy.review(2).unwrap(), CheckpointDecision::Approved);
        assert_eq!(policy.review(3).unwrap(), CheckpointDecision::Approved);
    }
}
