//! Shared test doubles for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Result;
use camino::Utf8Path;
use image::RgbImage;

use gridbin::models::FixedParameters;
use gridbin::services::{ModelEngine, VariantParameters};
use gridbin::ProgressSink;

/// Engine double that records every call and writes real placeholder
/// output, so runs can be resumed and animations assembled from it.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub prime_calls: usize,
    pub set_parameters_calls: usize,
    pub settle_calls: usize,
    pub export_calls: usize,
    pub camera_resets: usize,
    pub capture_calls: usize,
}

impl ModelEngine for ScriptedEngine {
    fn prime(&mut self, _fixed: &FixedParameters) -> Result<()> {
        self.prime_calls += 1;
        Ok(())
    }

    fn set_parameters(&mut self, _params: &VariantParameters) -> Result<()> {
        self.set_parameters_calls += 1;
        Ok(())
    }

    fn settle(&mut self) -> Result<()> {
        self.settle_calls += 1;
        Ok(())
    }

    fn export_mesh(&mut self, path: &Utf8Path) -> Result<bool> {
        self.export_calls += 1;
        std::fs::write(path, b"solid placeholder\nendsolid placeholder\n")?;
        Ok(true)
    }

    fn reset_camera_home(&mut self) -> Result<()> {
        self.camera_resets += 1;
        Ok(())
    }

    fn capture_viewport(&mut self, path: &Utf8Path, width: u32, height: u32) -> Result<bool> {
        self.capture_calls += 1;
        // a real decodable image, scaled down so tests stay fast
        let image = RgbImage::from_fn(width.min(8), height.min(8), |x, y| {
            image::Rgb([(x * 32) as u8, (y * 32) as u8, self.capture_calls as u8])
        });
        image.save(path.as_std_path())?;
        Ok(true)
    }
}

/// Progress double that can trigger cancellation once a given number
/// of variants has been processed.
#[derive(Debug)]
pub struct TestProgress {
    max: AtomicUsize,
    value: AtomicUsize,
    cancelled: AtomicBool,
    cancel_after: Option<usize>,
    proceed: bool,
}

impl TestProgress {
    pub fn new() -> Self {
        Self {
            max: AtomicUsize::new(0),
            value: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            cancel_after: None,
            proceed: true,
        }
    }

    pub fn cancelling_after(processed: usize) -> Self {
        Self {
            cancel_after: Some(processed),
            ..Self::new()
        }
    }

    pub fn declining() -> Self {
        Self {
            proceed: false,
            ..Self::new()
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn value(&self) -> usize {
        self.value.load(Ordering::SeqCst)
    }

    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

impl ProgressSink for TestProgress {
    fn set_max(&self, max: usize) {
        self.max.store(max, Ordering::SeqCst);
    }

    fn set_value(&self, value: usize) {
        self.value.store(value, Ordering::SeqCst);
        if let Some(limit) = self.cancel_after {
            if value >= limit {
                self.cancelled.store(true, Ordering::SeqCst);
            }
        }
    }

    fn add(&self, delta: usize) {
        self.value.fetch_add(delta, Ordering::SeqCst);
    }

    fn set_message(&self, _message: &str) {}

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn show(&self, _message: &str) {}

    fn hide(&self) {}

    fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.proceed
    }
}
