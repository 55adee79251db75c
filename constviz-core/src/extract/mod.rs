//! Declaration extraction from C# and Visual Basic source units.
//!
//! Each language has a logos token scanner and a scope-tracking walker that
//! turns `const` declarations into [`DeclarationDescriptor`]s. Extraction
//! works on one unit at a time and either returns every declaration of the
//! unit or fails the unit as a whole.

pub mod csharp;
mod lexer;
pub mod visual_basic;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::ConstvizResult;
use crate::index::DeclarationDescriptor;

/// Source language a unit is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationSource {
    CSharp,
    VisualBasic,
}

impl DeclarationSource {
    /// Language of a file, by extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("cs") {
            Some(Self::CSharp)
        } else if ext.eq_ignore_ascii_case("vb") {
            Some(Self::VisualBasic)
        } else {
            None
        }
    }

    /// Extracts every constant declaration of `unit`.
    pub fn extract(self, unit: &SourceUnit) -> ConstvizResult<Vec<DeclarationDescriptor>> {
        match self {
            Self::CSharp => csharp::extract_declarations(&unit.id, &unit.text),
            Self::VisualBasic => visual_basic::extract_declarations(&unit.id, &unit.text),
        }
    }
}

/// One file's worth of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Stable identifier, normally the file path
    pub id: String,
    pub language: DeclarationSource,
    pub text: String,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, language: DeclarationSource, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            language,
            text: text.into(),
        }
    }

    /// A unit for `path`, if its extension names a supported language.
    pub fn from_path(path: &Path, text: impl Into<String>) -> Option<Self> {
        let language = DeclarationSource::from_path(path)?;
        Some(Self::new(path.to_string_lossy(), language, text))
    }

    /// Whether the unit is designer or build output.
    pub fn is_generated(&self) -> bool {
        is_generated_path(&self.id)
    }
}

fn generated_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\.(designer\.(cs|vb)|g\.cs|g\.i\.cs)$")
            .expect("Hardcoded regex pattern is valid")
    })
}

/// Whether `path` names a generated file (`*.designer.cs`, `*.g.cs`, ...).
pub fn is_generated_path(path: &str) -> bool {
    generated_regex().is_match(path)
}
