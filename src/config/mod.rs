use crate::models::RunConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for loading and saving the YAML run configuration.
///
/// Manages a single file (`GridBin Config.yaml`) holding the variant
/// ranges, skip flags and post-processing settings for a run.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    run_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "GridBin Data")
    ///
    /// # Returns
    /// A new ConfigManager instance
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            run_config_path: config_dir.join("GridBin Config.yaml"),
            config_dir,
        })
    }

    /// Load the run configuration file.
    ///
    /// # Returns
    /// The loaded RunConfig, or default if file doesn't exist
    pub fn load_run_config(&self) -> Result<RunConfig> {
        if !self.run_config_path.exists() {
            tracing::warn!(
                "Run config file not found at {}, using defaults",
                self.run_config_path
            );
            return Ok(RunConfig::default());
        }

        let file_contents = fs::read_to_string(&self.run_config_path)
            .with_context(|| format!("Failed to read run config: {}", self.run_config_path))?;

        let config: RunConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse run config: {}", self.run_config_path))?;

        tracing::info!("Loaded run config from {}", self.run_config_path);
        Ok(config)
    }

    /// Save the run configuration file.
    ///
    /// # Arguments
    /// * `config` - The RunConfig to save
    pub fn save_run_config(&self, config: &RunConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize run config to YAML")?;

        fs::write(&self.run_config_path, yaml_string)
            .with_context(|| format!("Failed to write run config: {}", self.run_config_path))?;

        tracing::info!("Saved run config to {}", self.run_config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
