//! Configuration loading from constviz.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::ConstvizError;
use crate::extract::DeclarationSource;

/// Name of the configuration file looked up at the project root.
pub const CONFIG_FILE_NAME: &str = "constviz.toml";

/// Main configuration structure for constviz.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConstvizConfig {
    /// Which source languages to extract constants from.
    pub languages: LanguageConfig,
    /// Logging verbosity.
    pub logging: LoggingConfig,
    /// Project scanning options.
    pub scan: ScanConfig,
}

/// Language toggles.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LanguageConfig {
    /// Process `.cs` files.
    pub csharp: bool,
    /// Process `.vb` files.
    pub visual_basic: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            csharp: true,
            visual_basic: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable debug-level diagnostics.
    pub advanced: bool,
}

/// Scan configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// Extra directory names to skip while scanning.
    pub exclude: Vec<String>,
}

impl ConstvizConfig {
    /// Whether extraction should run for the given language.
    pub fn is_enabled(&self, source: DeclarationSource) -> bool {
        match source {
            DeclarationSource::CSharp => self.languages.csharp,
            DeclarationSource::VisualBasic => self.languages.visual_basic,
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid constviz.toml")
    }
}

/// Loads configuration from constviz.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<ConstvizConfig>> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content)
        .map_err(|e| ConstvizError::config(&path, e.message().to_string()))?;
    Ok(Some(cfg))
}
