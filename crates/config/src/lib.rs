use anyhow::{Context, Result};
use config_rs::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main reader configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Scan and pruning configuration
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Configuration for statistics-driven scans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Default number of rows per batch (default: 1024)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Evaluate the search argument against file statistics (default: true)
    #[serde(default = "default_pruning")]
    pub file_pruning: bool,

    /// Evaluate the search argument against stripe statistics (default: true)
    #[serde(default = "default_pruning")]
    pub stripe_pruning: bool,

    /// Evaluate the search argument against row group statistics (default: true)
    #[serde(default = "default_pruning")]
    pub row_group_pruning: bool,
}

fn default_batch_size() -> usize {
    1024
}

fn default_pruning() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            file_pruning: default_pruning(),
            stripe_pruning: default_pruning(),
            row_group_pruning: default_pruning(),
        }
    }
}

impl Config {
    /// Load Config with layered configuration priority:
    /// 1. Default values
    /// 2. TOML file (if provided)
    /// 3. Environment variables with the READER_ prefix, nested keys joined
    ///    by a double underscore (e.g. READER_SCAN__BATCH_SIZE=4096)
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("scan.batch_size", default_batch_size() as i64)?
            .set_default("scan.file_pruning", true)?
            .set_default("scan.stripe_pruning", true)?
            .set_default("scan.row_group_pruning", true)?;

        if let Some(file_path) = config_file {
            let path = Path::new(file_path);
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        // A single underscore would split snake_case keys, so nesting uses "__"
        builder = builder.add_source(
            Environment::with_prefix("READER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let reader_config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        reader_config.validate()?;
        Ok(reader_config)
    }

    /// Load Config from a TOML file
    ///
    /// Environment variables can still override values from the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .with_context(|| format!("Configuration path is not valid UTF-8: {}", path.display()))?;
        Self::load(Some(path_str))
    }

    /// Create a new Config from environment variables with defaults
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()
    }
}

impl ScanConfig {
    /// Validate the scan configuration
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.batch_size > 0, "scan batch_size must be greater than zero");
        Ok(())
    }
}
