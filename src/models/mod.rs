pub mod config;
pub mod plan;
pub mod state;

pub use config::{ForgeConfig, GeneratorConfig, RunnerConfig, ServerConfig, WorkflowConfig};
pub use plan::ProjectPlan;
pub use state::{WorkflowPhase, WorkflowState};
