// GridBin - Batch exporter for parametric Gridfinity bin variants
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the CLI entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{RunConfig, RunState};
pub use orchestrator::{RunOrchestrator, RunOutcome, RunReport};
pub use progress::{CancelFlag, LogProgress, ProgressSink};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
