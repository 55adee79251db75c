//! Builder API for indexing a project directory.
//!
//! ```rust,ignore
//! use constviz_core::prelude::*;
//!
//! let project = Constviz::new("/path/to/solution")
//!     .visual_basic(true)
//!     .exclude_dirs(["Generated"])
//!     .index()?;
//!
//! println!("{} constants", project.index.len());
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{load_config, ConstvizConfig};
use crate::error::ConstvizError;
use crate::index::{ConstantIndex, RebuildSummary};
use crate::scan::{gather_source_files, load_units};

/// Builder for indexing every constant under a project root.
#[derive(Debug, Clone)]
pub struct Constviz {
    root: PathBuf,
    /// Explicit configuration; `None` loads `constviz.toml` from the root
    config: Option<ConstvizConfig>,
    csharp: Option<bool>,
    visual_basic: Option<bool>,
    excluded_dirs: Vec<String>,
}

/// Result of [`Constviz::index`].
#[derive(Debug)]
pub struct ProjectIndex {
    pub index: ConstantIndex,
    pub summary: RebuildSummary,
    /// Configuration in effect, overrides applied
    pub config: ConstvizConfig,
    pub files: Vec<PathBuf>,
}

impl Constviz {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
            csharp: None,
            visual_basic: None,
            excluded_dirs: Vec::new(),
        }
    }

    /// Use `config` instead of reading `constviz.toml`.
    pub fn with_config(mut self, config: ConstvizConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the C# toggle.
    pub fn csharp(mut self, enabled: bool) -> Self {
        self.csharp = Some(enabled);
        self
    }

    /// Override the Visual Basic toggle.
    pub fn visual_basic(mut self, enabled: bool) -> Self {
        self.visual_basic = Some(enabled);
        self
    }

    /// Add directories to exclude from scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// The configuration with every override applied.
    pub fn resolve_config(&self) -> Result<ConstvizConfig> {
        let mut config = match &self.config {
            Some(config) => config.clone(),
            None => load_config(&self.root)?.unwrap_or_default(),
        };
        if let Some(enabled) = self.csharp {
            config.languages.csharp = enabled;
        }
        if let Some(enabled) = self.visual_basic {
            config.languages.visual_basic = enabled;
        }
        config.scan.exclude.extend(self.excluded_dirs.iter().cloned());
        Ok(config)
    }

    /// Scans the root and rebuilds a fresh index over every source file.
    pub fn index(&self) -> Result<ProjectIndex> {
        if !self.root.is_dir() {
            return Err(ConstvizError::invalid_argument(format!(
                "project root {} is not a directory",
                self.root.display()
            ))
            .into());
        }
        let config = self.resolve_config()?;

        let excludes: Vec<&str> = config.scan.exclude.iter().map(String::as_str).collect();
        let files = gather_source_files(&self.root, &excludes)
            .context("Failed to gather source files")?;
        let units = load_units(&files);

        let mut index = ConstantIndex::new();
        let summary = index
            .rebuild_all(units, &config)
            .context("Failed to rebuild constant index")?;

        Ok(ProjectIndex {
            index,
            summary,
            config,
            files,
        })
    }
}
