use std::fs::File;
use std::io;

use camino::Utf8PathBuf;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::{RunConfig, RunState};
use crate::progress::ProgressSink;
use crate::services::naming::{format_wall, variant_folder, MESH_PREFIX};
use crate::services::variants::VariantSpace;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive packaging was cancelled")]
    Cancelled,

    #[error("IO error during packaging: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Packages exported meshes into per-height ZIP archives, one per
/// wall thickness and division count, or copies the upload-worthy
/// subset into a staging tree instead.
pub struct ArchivePackager<'a> {
    config: &'a RunConfig,
    state: &'a RunState,
}

impl<'a> ArchivePackager<'a> {
    pub fn new(config: &'a RunConfig, state: &'a RunState) -> Self {
        Self { config, state }
    }

    /// Returns `(written, expected)` archive counts.
    pub fn run(&self, space: &VariantSpace, progress: &dyn ProgressSink) -> (usize, usize) {
        if self.config.copy_upload_worthy {
            for &wall in space.wall_widths() {
                for divisions in space.divisions() {
                    if progress.is_cancelled() {
                        return (0, 0);
                    }
                    if let Err(e) = self.copy_upload_worthy(wall, divisions) {
                        error!(
                            "Upload staging failed for wall {} divisions {divisions}: {e}",
                            format_wall(wall)
                        );
                    }
                }
            }
            return (0, 0);
        }

        let todo = space.wall_widths().len() * space.divisions().count() * space.z_values().len();
        let mut written = 0;
        for &wall in space.wall_widths() {
            for divisions in space.divisions() {
                for &z in space.z_values() {
                    if progress.is_cancelled() {
                        return (written, todo);
                    }
                    if self.package_one(wall, divisions, z, progress) {
                        written += 1;
                    }
                    progress.set_message(&format!("Generated {written} / {todo} ZIPs..."));
                }
            }
        }
        (written, todo)
    }

    fn package_one(&self, wall: f64, divisions: u32, z: u32, progress: &dyn ProgressSink) -> bool {
        match self.try_package(wall, divisions, z, progress) {
            Ok(written) => written,
            Err(ArchiveError::Cancelled) => {
                info!("Packaging cancelled at height {z}");
                false
            }
            Err(e) => {
                error!(
                    "Failed to package wall {} divisions {divisions} height {z}: {e}",
                    format_wall(wall)
                );
                false
            }
        }
    }

    fn try_package(
        &self,
        wall: f64,
        divisions: u32,
        z: u32,
        progress: &dyn ProgressSink,
    ) -> Result<bool, ArchiveError> {
        let source = variant_folder(&self.state.export_folder, wall, divisions);
        if !source.is_dir() {
            debug!("No export folder at {source}, nothing to package");
            return Ok(false);
        }

        let pattern = format!(r"^{MESH_PREFIX}_\d{{2}}x\d{{2}}x{z:02}_w.+d\d{{2}}\.stl$");
        let matcher = Regex::new(&pattern).expect("height pattern is valid");

        let mut names: Vec<String> = std::fs::read_dir(&source)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| matcher.is_match(name))
            .collect();
        names.sort();

        let zip_folder = self.state.zip_folder();
        std::fs::create_dir_all(&zip_folder)?;
        let zip_path = zip_folder.join(format!(
            "Gridfinity_Bin1.2_Z{z:02}WW{}_D{divisions:02}.zip",
            format_wall(wall)
        ));

        let mut writer = ZipWriter::new(File::create(&zip_path)?);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for name in &names {
            if progress.is_cancelled() {
                return Err(ArchiveError::Cancelled);
            }
            writer.start_file(name.as_str(), options)?;
            let mut input = File::open(source.join(name))?;
            io::copy(&mut input, &mut writer)?;
            progress.add(1);
        }
        writer.finish()?;
        debug!("Packaged {} meshes into {zip_path}", names.len());
        Ok(true)
    }

    /// Copies the size range worth publishing into a flat staging tree.
    fn copy_upload_worthy(&self, wall: f64, divisions: u32) -> Result<(), ArchiveError> {
        let source = variant_folder(&self.state.export_folder, wall, divisions);
        if !source.is_dir() {
            return Ok(());
        }
        // only bins up to six units per side are worth uploading
        let matcher = Regex::new(r"_(0[1-6])x(0[1-6])x(\d+)_").expect("size pattern is valid");

        let target: Utf8PathBuf =
            variant_folder(&self.state.upload_folder(), wall, divisions);
        std::fs::create_dir_all(&target)?;

        let mut copied = 0usize;
        for entry in std::fs::read_dir(&source)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !matcher.is_match(&name) {
                continue;
            }
            std::fs::copy(entry.path(), target.join(&name).as_std_path())?;
            copied += 1;
        }
        if copied == 0 {
            warn!("No upload-worthy meshes found under {source}");
        } else {
            info!("Staged {copied} upload-worthy meshes into {target}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{CancelFlag, LogProgress};
    use camino::Utf8Path;
    use tempfile::TempDir;

    #[test]
    fn test_missing_folder_packages_nothing() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(tmp.path()).unwrap();
        let config = RunConfig::default();
        let state = RunState::new(root.join("run"));
        let packager = ArchivePackager::new(&config, &state);
        let progress = LogProgress::new(CancelFlag::new(), true);
        assert!(!packager.package_one(1.2, 1, 6, &progress));
    }

    #[test]
    fn test_height_pattern_rejects_other_heights() {
        let pattern = format!(r"^{MESH_PREFIX}_\d{{2}}x\d{{2}}x06_w.+d\d{{2}}\.stl$");
        let matcher = Regex::new(&pattern).unwrap();
        assert!(matcher.is_match("gfbin1.2_01x02x06_w1.2d03.stl"));
        assert!(!matcher.is_match("gfbin1.2_01x02x12_w1.2d03.stl"));
        assert!(!matcher.is_match("gfbin1.2_01x02x06_w1.2d03.step"));
    }
}
