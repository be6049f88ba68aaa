use camino::Utf8PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{RunConfig, RunState, SCREENSHOT_HEIGHT, SCREENSHOT_WIDTH};
use crate::progress::ProgressSink;
use crate::services::engine::{ModelEngine, VariantParameters};
use crate::services::naming::{is_useless, variant_folder, variant_name};
use crate::services::variants::{Variant, VariantSpace};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export run was cancelled")]
    Cancelled,

    #[error("model engine failed: {0}")]
    Engine(anyhow::Error),

    #[error("IO error during export: {0}")]
    Io(#[from] std::io::Error),
}

/// Drives the model engine across a whole variant space, skipping work
/// that is already on disk and tallying the outcome into [`RunState`].
pub struct ExportLoop<'a> {
    config: &'a RunConfig,
    space: &'a VariantSpace,
}

impl<'a> ExportLoop<'a> {
    pub fn new(config: &'a RunConfig, space: &'a VariantSpace) -> Self {
        Self { config, space }
    }

    pub fn run(
        &self,
        engine: &mut dyn ModelEngine,
        state: &mut RunState,
        progress: &dyn ProgressSink,
    ) -> Result<(), ExportError> {
        for variant in self.space.iter() {
            if !state.is_running || progress.is_cancelled() {
                return Err(ExportError::Cancelled);
            }
            state.ensure_height_layer(variant.z_index);
            self.step(&variant, engine, state, progress)?;
        }
        Ok(())
    }

    fn step(
        &self,
        variant: &Variant,
        engine: &mut dyn ModelEngine,
        state: &mut RunState,
        progress: &dyn ProgressSink,
    ) -> Result<(), ExportError> {
        let folder = variant_folder(&state.export_folder, variant.wall_width, variant.divisions);
        let name = variant_name(
            variant.x,
            variant.y,
            variant.z,
            variant.wall_width,
            variant.divisions,
        );
        let mesh_path = folder.join(format!("{name}.stl"));

        // Dividers thinner than the allowance for the bin width would
        // produce degenerate geometry, so those combinations are never
        // exported. They still consume one progress tick.
        if self.config.skip_useless && is_useless(variant.x, variant.divisions) {
            state.skipped += 1;
            progress.set_value(state.total_processed());
            debug!("Useless combination skipped: {name}");
            return Ok(());
        }

        let screenshot_name = format!("{name}.jpg");
        let screenshot_path: Utf8PathBuf = state.screenshot_folder().join(&screenshot_name);

        let skip_mesh = self.config.skip_existing && mesh_path.is_file();
        let wants_preview = self.config.create_images && variant.wall_index == 0;
        // a surviving screenshot only counts when the mesh survived too;
        // regenerating the mesh recaptures the preview alongside it
        let preview_exists = wants_preview && skip_mesh && screenshot_path.is_file();
        let needs_geometry = !skip_mesh || (wants_preview && !preview_exists);

        if needs_geometry {
            let params = VariantParameters::from_variant(variant);
            engine.set_parameters(&params).map_err(ExportError::Engine)?;
            // Two settle passes; one is not always enough for the
            // backend to finish recomputation after a parameter change.
            engine.settle().map_err(ExportError::Engine)?;
            engine.settle().map_err(ExportError::Engine)?;
        }

        if skip_mesh {
            state.skipped += 1;
        } else {
            std::fs::create_dir_all(&folder)?;
            if wants_preview && !preview_exists {
                engine.reset_camera_home().map_err(ExportError::Engine)?;
            }
            if !engine.export_mesh(&mesh_path).map_err(ExportError::Engine)? {
                warn!("Mesh export reported failure for {mesh_path}");
            }
            state.generated += 1;
        }

        if wants_preview {
            let captured = preview_exists
                || engine
                    .capture_viewport(&screenshot_path, SCREENSHOT_WIDTH, SCREENSHOT_HEIGHT)
                    .map_err(ExportError::Engine)?;
            if captured {
                state.record_screenshot(
                    &screenshot_name,
                    variant.z_index,
                    self.config.wants_complete_animation(),
                    self.config.wants_per_height_animation(),
                );
            } else {
                warn!("Viewport capture reported failure for {screenshot_path}");
            }
        }

        progress.set_value(state.total_processed());
        debug!(
            "Processed {name} (generated: {}, skipped: {})",
            state.generated, state.skipped
        );
        Ok(())
    }
}
