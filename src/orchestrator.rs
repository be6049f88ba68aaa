use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::metrics::RunMetrics;
use crate::models::{RunConfig, RunPhase, RunState};
use crate::progress::{CancelFlag, ProgressSink};
use crate::services::{
    AnimationAssembler, ArchivePackager, ExportError, ExportLoop, ModelEngine, VariantSpace,
};

/// Final tallies of a run, for the caller and the logs.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub generated: usize,
    pub skipped: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub gifs_written: usize,
    pub gifs_expected: usize,
    pub archives_written: usize,
    pub archives_expected: usize,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// The whole pipeline ran to the end.
    Completed(RunReport),
    /// The run was cancelled; counts cover the work done before the stop.
    Cancelled(RunReport),
    /// A run was already in progress; it has been asked to stop instead.
    StoppedExisting,
}

/// Drives a full run: setup, export loop, then the animation and
/// packaging stages behind a continuation gate.
pub struct RunOrchestrator {
    config: RunConfig,
    cancel: CancelFlag,
    running: AtomicBool,
    metrics: RunMetrics,
}

impl RunOrchestrator {
    pub fn new(config: RunConfig, cancel: CancelFlag) -> Self {
        Self {
            config,
            cancel,
            running: AtomicBool::new(false),
            metrics: RunMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn run(
        &self,
        engine: &mut dyn ModelEngine,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome> {
        // A second invocation while a run is live requests a stop
        // instead of starting over.
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Run already in progress, requesting cancellation");
            self.cancel.cancel();
            return Ok(RunOutcome::StoppedExisting);
        }
        let outcome = self.run_inner(engine, progress);
        self.running.store(false, Ordering::SeqCst);
        outcome
    }

    fn run_inner(
        &self,
        engine: &mut dyn ModelEngine,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome> {
        self.config.validate()?;

        let space = VariantSpace::new(&self.config);
        let total = space.total();
        let export_folder = self.config.export_root.join(self.config.run_folder_name());

        let mut state = RunState::new(export_folder);
        state.phase = RunPhase::SettingUp;
        std::fs::create_dir_all(&state.export_folder)
            .with_context(|| format!("Failed to create run folder: {}", state.export_folder))?;
        if self.config.create_images {
            std::fs::create_dir_all(state.screenshot_folder()).with_context(|| {
                format!(
                    "Failed to create screenshot folder: {}",
                    state.screenshot_folder()
                )
            })?;
        }
        engine.prime(&self.config.fixed)?;

        info!(
            "Starting run into {} ({} variants)",
            state.export_folder, total
        );
        progress.show(&format!("Exporting {total} bin variants..."));
        progress.set_max(total);
        progress.set_value(0);

        state.is_running = true;
        state.phase = RunPhase::Exporting;
        let export_start = Instant::now();
        let export_result = ExportLoop::new(&self.config, &space).run(engine, &mut state, progress);
        let elapsed = export_start.elapsed();
        self.metrics.record_export_time(elapsed);
        self.metrics.record_generated(state.generated);
        self.metrics.record_skipped(state.skipped);

        let mut report = RunReport {
            generated: state.generated,
            skipped: state.skipped,
            total,
            elapsed,
            ..RunReport::default()
        };

        match export_result {
            Ok(()) => {}
            Err(ExportError::Cancelled) => {
                state.phase = RunPhase::Cancelled;
                progress.hide();
                progress.show(&format!(
                    "Cancelled after {} of {} variants ({} generated, {} skipped)",
                    state.total_processed(),
                    total,
                    state.generated,
                    state.skipped
                ));
                self.metrics.log_summary();
                return Ok(RunOutcome::Cancelled(report));
            }
            Err(e) => {
                state.phase = RunPhase::Cancelled;
                progress.hide();
                progress.show(&format!("Export failed: {e}"));
                return Err(e.into());
            }
        }

        progress.set_value(total);
        state.phase = RunPhase::AwaitingContinuation;
        let summary = format!(
            "Generated {} and skipped {} of {} variants in {:.1}s",
            state.generated,
            state.skipped,
            total,
            elapsed.as_secs_f64()
        );
        info!("{summary}");

        let wants_post = self.config.wants_animations()
            || self.config.create_zip
            || self.config.copy_upload_worthy;
        if wants_post && !progress.confirm("Export finished", &summary) {
            info!("Post-processing declined, finishing run");
            state.phase = RunPhase::Done;
            progress.hide();
            self.metrics.log_summary();
            return Ok(RunOutcome::Completed(report));
        }

        if self.config.wants_animations() && !progress.is_cancelled() {
            self.generate_animations(&space, &mut state, progress, &mut report)?;
        }

        if (self.config.create_zip || self.config.copy_upload_worthy) && !progress.is_cancelled() {
            state.phase = RunPhase::Packaging;
            progress.set_max(state.total_processed());
            progress.set_value(0);
            progress.set_message("Packaging archives...");
            let packager = ArchivePackager::new(&self.config, &state);
            let (written, expected) = packager.run(&space, progress);
            report.archives_written = written;
            report.archives_expected = expected;
            self.metrics.record_archives_written(written);
        }

        progress.hide();
        if progress.is_cancelled() {
            state.phase = RunPhase::Cancelled;
            progress.show("Run cancelled during post-processing");
            self.metrics.log_summary();
            return Ok(RunOutcome::Cancelled(report));
        }

        state.phase = RunPhase::Done;
        progress.show(&format!(
            "Run complete: {} generated, {} skipped, {} GIFs, {} ZIPs",
            report.generated, report.skipped, report.gifs_written, report.archives_written
        ));
        self.metrics.log_summary();
        Ok(RunOutcome::Completed(report))
    }

    fn generate_animations(
        &self,
        space: &VariantSpace,
        state: &mut RunState,
        progress: &dyn ProgressSink,
        report: &mut RunReport,
    ) -> Result<()> {
        state.phase = RunPhase::GeneratingAnimations;

        let per_height_frames: usize = state
            .screenshot_z_filenames
            .iter()
            .map(|frames| frames.len())
            .sum();
        let frames_total = state.screenshot_filenames.len() + per_height_frames;
        if frames_total == 0 {
            info!("No preview images recorded, skipping animations");
            return Ok(());
        }

        let gif_folder = state.gif_folder();
        std::fs::create_dir_all(&gif_folder)
            .with_context(|| format!("Failed to create GIF folder: {gif_folder}"))?;

        progress.set_max(frames_total);
        progress.set_value(0);
        progress.set_message("Assembling animations...");

        let screenshot_folder = state.screenshot_folder();
        let assembler = AnimationAssembler::new(&screenshot_folder, &self.config.animation);
        // one timestamp for the whole stage so its files sort together
        let stamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S");

        if !state.screenshot_filenames.is_empty() {
            report.gifs_expected += 1;
            let target = gif_folder.join(format!("complete-{stamp}.gif"));
            if assembler.assemble(&state.screenshot_filenames, &target, progress) {
                report.gifs_written += 1;
                self.metrics.record_gif_written();
            }
        }

        for (z_index, frames) in state.screenshot_z_filenames.iter().enumerate() {
            if frames.is_empty() {
                continue;
            }
            if progress.is_cancelled() {
                break;
            }
            report.gifs_expected += 1;
            let z = space.z_values()[z_index];
            let target = gif_folder.join(format!("z{z:02}-{stamp}.gif"));
            if assembler.assemble(frames, &target, progress) {
                report.gifs_written += 1;
                self.metrics.record_gif_written();
            }
        }

        self.metrics.record_frames_decoded(assembler.frames_decoded());
        info!(
            "Animations done: {} of {} written",
            report.gifs_written, report.gifs_expected
        );
        Ok(())
    }
}
