use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Viewport snapshot resolution for preview images.
pub const SCREENSHOT_WIDTH: u32 = 640;
pub const SCREENSHOT_HEIGHT: u32 = 360;

/// Errors produced by [`RunConfig::validate`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("empty {0} range")]
    EmptyRange(&'static str),

    #[error("no wall thickness values configured")]
    NoWallWidths,

    #[error("wall thickness values must be positive")]
    NonPositiveWallWidth,

    #[error("z step must be greater than zero")]
    ZeroZStep,
}

/// GIF assembly tuning, loaded as part of [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    /// Maximum frames per GIF; 0 means a single unbounded batch.
    #[serde(default)]
    pub max_frames_per_gif: usize,

    #[serde(default = "default_gif_fps")]
    pub fps: u32,

    /// Lossiness, 0..=200. Higher trades quality for speed and size.
    #[serde(default = "default_gif_lossy")]
    pub lossy: u32,

    /// Optimization level, 0..=3. Above 0 a single global palette is
    /// computed for the whole GIF instead of one palette per frame.
    #[serde(default = "default_gif_optimize")]
    pub optimize: u32,

    /// Palette size, clamped to 16..=256 at encode time.
    #[serde(default = "default_gif_colors")]
    pub colors: usize,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            max_frames_per_gif: 0,
            fps: default_gif_fps(),
            lossy: default_gif_lossy(),
            optimize: default_gif_optimize(),
            colors: default_gif_colors(),
        }
    }
}

/// Design parameters pushed to the model engine once per run, before the
/// export loop starts. These do not vary across the variant space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedParameters {
    #[serde(default = "default_magnet_diameter")]
    pub magnet_diameter: f64,

    #[serde(default = "default_magnet_remove_diameter")]
    pub magnet_remove_diameter: f64,

    #[serde(default = "default_magnet_depth")]
    pub magnet_depth: f64,

    /// Radius of the scoop curve in millimeters; 0 disables it.
    #[serde(default = "default_scoop_radius")]
    pub scoop_radius: f64,
}

impl Default for FixedParameters {
    fn default() -> Self {
        Self {
            magnet_diameter: default_magnet_diameter(),
            magnet_remove_diameter: default_magnet_remove_diameter(),
            magnet_depth: default_magnet_depth(),
            scoop_radius: default_scoop_radius(),
        }
    }
}

/// Immutable configuration for one export run.
///
/// Loaded from `GridBin Config.yaml` by [`crate::config::ConfigManager`];
/// the defaults mirror the values the exporter has always shipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Root folder that run folders are created under.
    #[serde(default = "default_export_root")]
    pub export_root: Utf8PathBuf,

    // Grid ranges, all inclusive
    #[serde(default = "default_one")]
    pub x_start: u32,
    #[serde(default = "default_grid_end")]
    pub x_end: u32,
    #[serde(default = "default_one")]
    pub y_start: u32,
    #[serde(default = "default_grid_end")]
    pub y_end: u32,

    /// Heights form the arithmetic sequence z_start, z_start + z_step, ...
    /// for every value <= z_end.
    #[serde(default = "default_z_start")]
    pub z_start: u32,
    #[serde(default = "default_z_step")]
    pub z_step: u32,
    #[serde(default = "default_z_end")]
    pub z_end: u32,

    /// Wall thickness values in millimeters, rounded to two decimals.
    #[serde(default = "default_wall_widths")]
    pub wall_widths: Vec<f64>,

    #[serde(default = "default_one")]
    pub divisions_start: u32,
    #[serde(default = "default_divisions_end")]
    pub divisions_end: u32,

    /// Skip variants whose division count is useless for their width.
    #[serde(default = "default_true")]
    pub skip_useless: bool,

    /// Skip exporting when the mesh file already exists on disk.
    #[serde(default = "default_true")]
    pub skip_existing: bool,

    /// Capture a preview image per x/y/z/divisions combination.
    #[serde(default = "default_true")]
    pub create_images: bool,

    /// Assemble one animation over every preview image.
    #[serde(default)]
    pub gif_complete: bool,

    /// Assemble one animation per height layer.
    #[serde(default)]
    pub gif_per_height: bool,

    #[serde(default)]
    pub animation: AnimationSettings,

    /// Package per-height ZIP archives after the export loop.
    #[serde(default)]
    pub create_zip: bool,

    /// Copy upload-worthy meshes into a flat folder instead of archiving.
    #[serde(default)]
    pub copy_upload_worthy: bool,

    #[serde(default)]
    pub fixed: FixedParameters,
}

impl Default for RunConfig {
    fn default() -> Self {
        // serde defaults double as the programmatic defaults
        serde_yaml_ng::from_str("{}").expect("default config must deserialize")
    }
}

impl RunConfig {
    /// Check the range and value invariants the rest of the pipeline
    /// relies on. Called once by the orchestrator before setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.x_start > self.x_end {
            return Err(ConfigError::EmptyRange("x"));
        }
        if self.y_start > self.y_end {
            return Err(ConfigError::EmptyRange("y"));
        }
        if self.z_start > self.z_end {
            return Err(ConfigError::EmptyRange("z"));
        }
        if self.divisions_start > self.divisions_end {
            return Err(ConfigError::EmptyRange("divisions"));
        }
        if self.z_step == 0 {
            return Err(ConfigError::ZeroZStep);
        }
        if self.wall_widths.is_empty() {
            return Err(ConfigError::NoWallWidths);
        }
        if self.wall_widths.iter().any(|w| *w <= 0.0) {
            return Err(ConfigError::NonPositiveWallWidth);
        }
        Ok(())
    }

    /// Name of the run folder under the export root, derived from the
    /// configured ranges so distinct design spaces never collide.
    pub fn run_folder_name(&self) -> String {
        format!(
            "bin_{}-{}x{}-{}x{}-{}s{}_d{}-{}",
            self.x_start,
            self.x_end,
            self.y_start,
            self.y_end,
            self.z_start,
            self.z_end,
            self.z_step,
            self.divisions_start,
            self.divisions_end
        )
    }

    /// The complete animation needs preview images to exist.
    pub fn wants_complete_animation(&self) -> bool {
        self.gif_complete && self.create_images
    }

    /// Per-height animations need preview images to exist.
    pub fn wants_per_height_animation(&self) -> bool {
        self.gif_per_height && self.create_images
    }

    pub fn wants_animations(&self) -> bool {
        self.wants_complete_animation() || self.wants_per_height_animation()
    }
}

fn default_export_root() -> Utf8PathBuf {
    Utf8PathBuf::from("Export-Bins")
}

fn default_one() -> u32 {
    1
}

fn default_grid_end() -> u32 {
    10
}

fn default_z_start() -> u32 {
    3
}

fn default_z_step() -> u32 {
    3
}

fn default_z_end() -> u32 {
    18
}

fn default_wall_widths() -> Vec<f64> {
    vec![1.5, 1.2, 0.9]
}

fn default_divisions_end() -> u32 {
    6
}

fn default_true() -> bool {
    true
}

fn default_gif_fps() -> u32 {
    6
}

fn default_gif_lossy() -> u32 {
    100
}

fn default_gif_optimize() -> u32 {
    3
}

fn default_gif_colors() -> usize {
    128
}

fn default_magnet_diameter() -> f64 {
    6.1
}

fn default_magnet_remove_diameter() -> f64 {
    3.0
}

fn default_magnet_depth() -> f64 {
    2.4
}

fn default_scoop_radius() -> f64 {
    10.0
}
