use std::borrow::Cow;
use std::fs::File;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use color_quant::NeuQuant;
use gif::{Encoder, Repeat};
use image::RgbaImage;
use thiserror::Error;
use tracing::{error, info};

use crate::models::AnimationSettings;
use crate::progress::ProgressSink;

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("animation assembly was cancelled")]
    Cancelled,

    #[error("failed to decode frame image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode GIF: {0}")]
    Encode(#[from] gif::EncodingError),

    #[error("IO error during animation assembly: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns an ordered list of viewport screenshots into looping GIFs.
///
/// When a frame cap is configured the sequence is split into batches;
/// the first batch keeps the requested file name and later batches get
/// a `-part{N}` suffix.
pub struct AnimationAssembler<'a> {
    screenshot_dir: &'a Utf8Path,
    settings: &'a AnimationSettings,
    decoded: AtomicU64,
}

impl<'a> AnimationAssembler<'a> {
    pub fn new(screenshot_dir: &'a Utf8Path, settings: &'a AnimationSettings) -> Self {
        Self {
            screenshot_dir,
            settings,
            decoded: AtomicU64::new(0),
        }
    }

    /// Frames actually decoded so far, across all `assemble` calls.
    /// Cancelled or failed batches only count what they got through.
    pub fn frames_decoded(&self) -> u64 {
        self.decoded.load(Ordering::Relaxed)
    }

    /// Assemble `filenames` into the GIF(s) rooted at `target`.
    ///
    /// Returns whether the animation was fully written. Cancellation
    /// and per-file failures are logged, not propagated; the caller
    /// tallies success and moves on.
    pub fn assemble(
        &self,
        filenames: &[String],
        target: &Utf8Path,
        progress: &dyn ProgressSink,
    ) -> bool {
        match self.try_assemble(filenames, target, progress) {
            Ok(written) => written,
            Err(AnimationError::Cancelled) => {
                info!("Animation assembly cancelled for {target}");
                false
            }
            Err(e) => {
                error!("Failed to assemble {target}: {e}");
                false
            }
        }
    }

    fn try_assemble(
        &self,
        filenames: &[String],
        target: &Utf8Path,
        progress: &dyn ProgressSink,
    ) -> Result<bool, AnimationError> {
        if filenames.is_empty() {
            return Ok(false);
        }

        let batch_size = if self.settings.max_frames_per_gif == 0 {
            filenames.len()
        } else {
            self.settings.max_frames_per_gif
        };

        for (batch_index, batch) in filenames.chunks(batch_size).enumerate() {
            if progress.is_cancelled() {
                return Err(AnimationError::Cancelled);
            }
            let path = if batch_index == 0 {
                target.to_owned()
            } else {
                part_path(target, batch_index + 1)
            };
            let frames = self.read_frames(batch, progress)?;
            self.encode(&frames, &path)?;
        }
        Ok(true)
    }

    fn read_frames(
        &self,
        filenames: &[String],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<RgbaImage>, AnimationError> {
        let mut frames = Vec::with_capacity(filenames.len());
        for (i, name) in filenames.iter().enumerate() {
            // polling every frame would be overkill for small images
            if i % 3 == 0 && progress.is_cancelled() {
                return Err(AnimationError::Cancelled);
            }
            let frame = image::open(self.screenshot_dir.join(name))?.into_rgba8();
            frames.push(frame);
            self.decoded.fetch_add(1, Ordering::Relaxed);
            progress.add(1);
        }
        Ok(frames)
    }

    fn encode(&self, frames: &[RgbaImage], path: &Utf8Path) -> Result<(), AnimationError> {
        let (width, height) = frames[0].dimensions();
        let delay = (100 / self.settings.fps.max(1)) as u16;
        let samplefac = (1 + self.settings.lossy * 29 / 200).clamp(1, 30) as i32;
        let colors = self.settings.colors.clamp(16, 256);
        let mut file = File::create(path)?;

        if self.settings.optimize > 0 {
            // one palette trained on every frame, shared across the GIF
            let mut samples = Vec::with_capacity(frames.len() * frames[0].as_raw().len());
            for frame in frames {
                samples.extend_from_slice(frame.as_raw());
            }
            let quantizer = NeuQuant::new(samplefac, colors, &samples);
            let palette = quantizer.color_map_rgb();
            let mut encoder = Encoder::new(&mut file, width as u16, height as u16, &palette)?;
            encoder.set_repeat(Repeat::Infinite)?;
            for frame in frames {
                let mut out = indexed_frame(frame, width, height, &quantizer, delay);
                out.palette = None;
                encoder.write_frame(&out)?;
            }
        } else {
            let mut encoder = Encoder::new(&mut file, width as u16, height as u16, &[])?;
            encoder.set_repeat(Repeat::Infinite)?;
            for frame in frames {
                let quantizer = NeuQuant::new(samplefac, colors, frame.as_raw());
                let mut out = indexed_frame(frame, width, height, &quantizer, delay);
                out.palette = Some(quantizer.color_map_rgb());
                encoder.write_frame(&out)?;
            }
        }
        Ok(())
    }
}

fn indexed_frame(
    frame: &RgbaImage,
    width: u32,
    height: u32,
    quantizer: &NeuQuant,
    delay: u16,
) -> gif::Frame<'static> {
    let indices: Vec<u8> = frame
        .as_raw()
        .chunks_exact(4)
        .map(|pixel| quantizer.index_of(pixel) as u8)
        .collect();
    let mut out = gif::Frame::default();
    out.width = width as u16;
    out.height = height as u16;
    out.buffer = Cow::Owned(indices);
    out.delay = delay;
    out
}

fn part_path(target: &Utf8Path, part: usize) -> Utf8PathBuf {
    let stem = target
        .as_str()
        .strip_suffix(".gif")
        .unwrap_or(target.as_str());
    Utf8PathBuf::from(format!("{stem}-part{part}.gif"))
}
