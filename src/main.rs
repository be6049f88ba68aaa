//! GridBin - Batch exporter for parametric Gridfinity bin variants
//!
//! Main entry point for the CLI application.
//!
//! # Overview
//!
//! This binary crate resumes or post-processes an export run from the
//! files already on disk. It initializes:
//! - Logging infrastructure (file rotation + console output)
//! - Configuration loading ([`ConfigManager`])
//! - Cancellation wiring (Ctrl-C flips a shared [`CancelFlag`])
//! - The run orchestrator with a detached engine
//!
//! Without a modelling backend attached, every variant whose mesh is
//! already present is skipped and the animation and packaging stages
//! run against the surviving output tree. A variant that would need
//! live geometry aborts the run with an error.
//!
//! # Configuration Files
//!
//! Expected in `GridBin Data/` directory:
//! - `GridBin Config.yaml`: Variant ranges, skip flags, animation and
//!   packaging settings

use anyhow::Result;
use gridbin::services::DetachedEngine;
use gridbin::{CancelFlag, ConfigManager, LogProgress, RunOrchestrator, RunOutcome, APP_NAME, VERSION};

fn main() -> Result<()> {
    // Setup logging with both file and console output
    let _guard = gridbin::logging::setup_logging("logs", "gridbin", false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Create configuration manager and load the run configuration
    let config_manager = ConfigManager::new("GridBin Data")?;
    let config = config_manager.load_run_config()?;

    tracing::info!(
        "Loaded run configuration - export root: {}, walls: {:?}",
        config.export_root,
        config.wall_widths
    );

    // Wire Ctrl-C to the shared cancellation flag
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            tracing::warn!("Interrupt received, requesting cancellation");
            cancel.cancel();
        })?;
    }

    let progress = LogProgress::new(cancel.clone(), true);
    let orchestrator = RunOrchestrator::new(config, cancel);

    // No modelling backend attached from the CLI; this resumes a run
    // from existing output and re-runs the post-processing stages.
    let mut engine = DetachedEngine;
    match orchestrator.run(&mut engine, &progress)? {
        RunOutcome::Completed(report) => {
            tracing::info!(
                "Run completed: {} generated, {} skipped of {} ({} GIFs, {} ZIPs)",
                report.generated,
                report.skipped,
                report.total,
                report.gifs_written,
                report.archives_written
            );
        }
        RunOutcome::Cancelled(report) => {
            tracing::warn!(
                "Run cancelled: {} of {} variants processed",
                report.generated + report.skipped,
                report.total
            );
        }
        RunOutcome::StoppedExisting => {
            tracing::warn!("Another run was already in progress");
        }
    }

    tracing::info!("Application shutdown complete");
    Ok(())
}
