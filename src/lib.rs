// Module declarations for the library crate.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod inject;
pub mod logger;
pub mod shell;
pub mod telemetry;
pub mod util;

// Re-export the pipeline's entry points for the shells, tests and benches.
pub use dispatch::{stats, Disposition, Dispatcher};
