//! Configuration for pidigits

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::StoreOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the packed digit file
    #[serde(rename = "file-path")]
    pub file_path: PathBuf,

    /// Bytes read per chunk when streaming
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    /// Upper bound on matches returned by one search
    #[serde(rename = "max-matches")]
    pub max_matches: usize,

    /// Explicit total digit count, required for an odd count
    #[serde(rename = "digit-count", skip_serializing_if = "Option::is_none")]
    pub digit_count: Option<u64>,

    /// Digits shown on each side of a match
    #[serde(rename = "context-radius")]
    pub context_radius: u64,
}

fn default_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pidigits")
        .join("pi_digits.bin")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
            max_matches: crate::DEFAULT_MAX_MATCHES,
            digit_count: None,
            context_radius: crate::DEFAULT_CONTEXT_RADIUS,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try default locations
        let default_paths = [
            Some(PathBuf::from(".pidigits.yml")),
            dirs::config_dir().map(|p| p.join("pidigits").join("pidigits.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check the numeric limits before opening a store
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(eyre::eyre!("chunk-size must be positive"));
        }
        if self.max_matches == 0 {
            return Err(eyre::eyre!("max-matches must be positive"));
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            chunk_size: self.chunk_size,
            max_matches: self.max_matches,
            digit_count: self.digit_count,
        }
    }
}
