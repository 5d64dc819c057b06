//! Service configuration
//!
//! Loaded from an optional TOML file; every key has a default. Command-line
//! flags (and their environment variables) are applied on top by `main`.
//!
//! ```toml
//! bind = "0.0.0.0:8000"
//! storage_dir = "/var/tmp/waterfall"
//! output_path = "/tmp/gantt.png"
//! dpi = 300.0
//!
//! [theme]
//! bg = "#23272A"
//! text = "#FFFDE0"
//! # ... all eight colors are required once the table is present
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use waterfall_core::ColorTheme;
use waterfall_render::raster::DEFAULT_DPI;
use waterfall_render::DEFAULT_OUTPUT_PATH;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Listen address of `waterfall serve`
    pub bind: String,
    /// Directory uploaded CSV files are kept in
    pub storage_dir: PathBuf,
    /// Where `waterfall render` writes PNG output by default
    pub output_path: PathBuf,
    pub dpi: f32,
    pub theme: ColorTheme,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            storage_dir: std::env::temp_dir().join("waterfall-uploads"),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            dpi: DEFAULT_DPI,
            theme: ColorTheme::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("in config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            anyhow::bail!("dpi must be a positive number, got {}", self.dpi);
        }
        Ok(())
    }
}
