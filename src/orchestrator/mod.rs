pub mod generator;
pub mod prompts;
pub mod script_runner;

pub use generator::{generate_with_retry, CliGenerator, Generator};
pub use script_runner::GenerationRunner;
