use camino::{Utf8Path, Utf8PathBuf};

/// Phase of the orchestrator state machine, tracked for logging and so a
/// summary can say where a run was when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    SettingUp,
    Exporting,
    AwaitingContinuation,
    GeneratingAnimations,
    Packaging,
    Done,
    Cancelled,
}

/// Mutable state for a single export run.
///
/// Owned by the orchestrator and handed by reference into each stage;
/// nothing here outlives the run. The files on disk are the only state
/// that persists, and they double as the skip/resume state of the next run.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run folder every output lands under.
    pub export_folder: Utf8PathBuf,

    /// Meshes exported by this run.
    pub generated: usize,

    /// Variants skipped (existing mesh or useless bin).
    pub skipped: usize,

    /// Preview file names in enumeration order, for the complete animation.
    pub screenshot_filenames: Vec<String>,

    /// Preview file names grouped by height layer, indexed by z position.
    pub screenshot_z_filenames: Vec<Vec<String>>,

    pub is_running: bool,
    pub phase: RunPhase,
}

impl RunState {
    pub fn new(export_folder: Utf8PathBuf) -> Self {
        Self {
            export_folder,
            generated: 0,
            skipped: 0,
            screenshot_filenames: Vec::new(),
            screenshot_z_filenames: Vec::new(),
            is_running: false,
            phase: RunPhase::Idle,
        }
    }

    /// Variants processed so far. Equals the enumerator's total once a
    /// loop completes without cancellation.
    pub fn total_processed(&self) -> usize {
        self.generated + self.skipped
    }

    pub fn screenshot_folder(&self) -> Utf8PathBuf {
        self.export_folder.join("screenshots")
    }

    pub fn gif_folder(&self) -> Utf8PathBuf {
        self.export_folder.join("gif")
    }

    pub fn zip_folder(&self) -> Utf8PathBuf {
        self.export_folder.join("zip")
    }

    pub fn upload_folder(&self) -> Utf8PathBuf {
        self.export_folder.join("todo-upload")
    }

    /// Make sure a filename list exists for the given height layer.
    pub fn ensure_height_layer(&mut self, z_index: usize) {
        while self.screenshot_z_filenames.len() <= z_index {
            self.screenshot_z_filenames.push(Vec::new());
        }
    }

    /// Record a captured (or already present) preview image.
    pub fn record_screenshot(
        &mut self,
        filename: &str,
        z_index: usize,
        complete: bool,
        per_height: bool,
    ) {
        if complete {
            self.screenshot_filenames.push(filename.to_string());
        }
        if per_height {
            self.ensure_height_layer(z_index);
            self.screenshot_z_filenames[z_index].push(filename.to_string());
        }
    }
}

impl AsRef<Utf8Path> for RunState {
    fn as_ref(&self) -> &Utf8Path {
        &self.export_folder
    }
}
