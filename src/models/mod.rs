//! Data models for the exporter.
//!
//! - [`RunConfig`]: the immutable per-run configuration, loaded from
//!   `GridBin Config.yaml` by [`crate::config::ConfigManager`]
//! - [`RunState`]: mutable run state owned by the orchestrator and shared
//!   by reference with the export loop
//! - [`RunPhase`]: the orchestrator state machine phases

pub mod run_config;
pub mod run_state;

pub use run_config::{
    AnimationSettings, ConfigError, FixedParameters, RunConfig, SCREENSHOT_HEIGHT, SCREENSHOT_WIDTH,
};
pub use run_state::{RunPhase, RunState};
