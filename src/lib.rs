// Codeforge - AI Code-Generation Orchestrator
// Turns a requirements document into a reviewed, tested, packaged project
// through iterative generation and self-correction.

pub mod cli;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod server;
pub mod state;
pub mod store;
pub mod workflow;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use error::WorkflowError;
pub use models::{ForgeConfig, ProjectPlan, WorkflowPhase, WorkflowState};
pub use state::StateManager;
pub use workflow::WorkflowEngine;
