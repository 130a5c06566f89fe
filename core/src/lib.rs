pub mod config;
pub mod error;
pub mod layout;
pub mod report;
pub mod solver;

pub use config::SolverConfig;
pub use error::FatCountError;
pub use layout::VolumeLayout;
pub use report::{write_csv, write_csv_file, OUTPUT_FILE};
pub use solver::{solve, IterationRow, Solution};
