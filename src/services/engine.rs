use anyhow::{bail, Result};
use camino::Utf8Path;
use tracing::info;

use crate::models::FixedParameters;
use crate::services::naming::format_wall;
use crate::services::variants::Variant;

/// The user-parameter values pushed into the model for one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantParameters {
    pub width: u32,
    pub depth: u32,
    pub height: u32,
    pub wall_expr: String,
    pub divisions: u32,
}

impl VariantParameters {
    pub fn from_variant(variant: &Variant) -> Self {
        Self {
            width: variant.x,
            depth: variant.y,
            height: variant.z,
            wall_expr: format!("{} mm", format_wall(variant.wall_width)),
            divisions: variant.divisions,
        }
    }
}

/// Seam to the parametric modelling backend that regenerates geometry
/// and produces mesh and viewport output.
///
/// Implementations are driven strictly serially from one thread. The
/// `bool` results distinguish a per-variant failure (logged, tallied,
/// run continues) from a hard error that aborts the run.
pub trait ModelEngine {
    /// Push the run-constant parameters once before the export loop.
    fn prime(&mut self, fixed: &FixedParameters) -> Result<()>;

    /// Push the per-variant parameters, marking geometry as stale.
    fn set_parameters(&mut self, params: &VariantParameters) -> Result<()>;

    /// Let the backend finish recomputing after a parameter change.
    fn settle(&mut self) -> Result<()>;

    /// Export the current geometry as a mesh file at `path`.
    fn export_mesh(&mut self, path: &Utf8Path) -> Result<bool>;

    /// Reset the viewport camera to the home framing.
    fn reset_camera_home(&mut self) -> Result<()>;

    /// Capture the viewport as an image file at `path`.
    fn capture_viewport(&mut self, path: &Utf8Path, width: u32, height: u32) -> Result<bool>;
}

/// Engine used when no modelling backend is attached.
///
/// Lets the CLI resume a finished or interrupted run purely from the
/// files already on disk: every variant is skipped as existing and the
/// animation and packaging stages work from the surviving output tree.
/// Any operation that would need live geometry is a hard error.
#[derive(Debug, Default)]
pub struct DetachedEngine;

impl ModelEngine for DetachedEngine {
    fn prime(&mut self, _fixed: &FixedParameters) -> Result<()> {
        info!("No model engine attached, fixed parameters not applied");
        Ok(())
    }

    fn set_parameters(&mut self, _params: &VariantParameters) -> Result<()> {
        bail!("no model engine attached")
    }

    fn settle(&mut self) -> Result<()> {
        bail!("no model engine attached")
    }

    fn export_mesh(&mut self, _path: &Utf8Path) -> Result<bool> {
        bail!("no model engine attached")
    }

    fn reset_camera_home(&mut self) -> Result<()> {
        bail!("no model engine attached")
    }

    fn capture_viewport(&mut self, _path: &Utf8Path, _width: u32, _height: u32) -> Result<bool> {
        bail!("no model engine attached")
    }
}
