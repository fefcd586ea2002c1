pub mod manager;

pub use manager::{calculate_checksum, StateManager};
