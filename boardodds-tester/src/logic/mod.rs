pub mod board_file;
pub mod reports;
pub mod simulation;
pub mod sweep;

pub use board_file::FileBoard;
pub use sweep::{SimulationConfig, SweepConfig, SweepResult, run_sweep};
