//! Loopback storage configuration.
//!
//! ```toml
//! chunk_size = 65536
//! buckets = ["recordings", "archive"]
//! create_buckets = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Default GetObject chunk size (256KB)
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopbackConfig {
    /// Maximum bytes per GetObject response chunk
    pub chunk_size: usize,

    /// Buckets that exist from the start
    pub buckets: Vec<String>,

    /// Whether PutObject creates a missing bucket instead of failing with NotFound
    pub create_buckets: bool,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            buckets: Vec::new(),
            create_buckets: true,
        }
    }
}

impl LoopbackConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse loopback config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.chunk_size > 0, "chunk_size must be greater than zero");

        let mut seen = HashSet::new();
        for bucket in &self.buckets {
            anyhow::ensure!(!bucket.is_empty(), "bucket names cannot be empty");
            anyhow::ensure!(seen.insert(bucket), "duplicate bucket: {}", bucket);
        }
        Ok(())
    }
}
