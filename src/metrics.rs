// Performance metrics module
//
// Provides lightweight metrics tracking for monitoring export runs

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Global run metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Metrics are collected over a run and logged on completion for
/// performance analysis.
#[derive(Debug)]
pub struct RunMetrics {
    /// Total number of meshes exported
    pub variants_generated: AtomicUsize,

    /// Total number of variants skipped (existing or useless)
    pub variants_skipped: AtomicUsize,

    /// Total number of preview frames decoded for animations
    pub frames_decoded: AtomicU64,

    /// Number of GIF files written
    pub gifs_written: AtomicUsize,

    /// Number of ZIP archives written
    pub archives_written: AtomicUsize,

    /// Total time spent in the export loop in milliseconds
    pub export_time_ms: AtomicU64,

    /// Run start time
    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            variants_generated: AtomicUsize::new(0),
            variants_skipped: AtomicUsize::new(0),
            frames_decoded: AtomicU64::new(0),
            gifs_written: AtomicUsize::new(0),
            archives_written: AtomicUsize::new(0),
            export_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_generated(&self, count: usize) {
        self.variants_generated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_skipped(&self, count: usize) {
        self.variants_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_frames_decoded(&self, count: u64) {
        self.frames_decoded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_gif_written(&self) {
        self.gifs_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_archives_written(&self, count: usize) {
        self.archives_written.fetch_add(count, Ordering::Relaxed);
    }

    /// Record time spent in the export loop
    pub fn record_export_time(&self, duration: Duration) {
        self.export_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get average export time per generated mesh in milliseconds
    pub fn avg_export_time_ms(&self) -> f64 {
        let total = self.export_time_ms.load(Ordering::Relaxed);
        let count = self.variants_generated.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Run Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Variants: {} generated, {} skipped",
            self.variants_generated.load(Ordering::Relaxed),
            self.variants_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Export time: {:.2}s (avg: {:.2}ms per mesh)",
            self.export_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_export_time_ms()
        );
        tracing::info!(
            "Animations: {} GIFs from {} decoded frames",
            self.gifs_written.load(Ordering::Relaxed),
            self.frames_decoded.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Packaging: {} archives written",
            self.archives_written.load(Ordering::Relaxed)
        );
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}
