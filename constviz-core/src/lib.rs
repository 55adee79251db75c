//! constviz-core: constant value index and whole-word matcher for C# and
//! Visual Basic sources.
//!
//! The library keeps a table of every compile-time constant declared in a
//! project and answers, for any line of editor text, which identifiers in
//! it are known constants and what value each one has.
//!
//! # Features
//!
//! - **Declaration extraction**: C# and Visual Basic `const` declarations,
//!   qualified by their enclosing namespaces and types
//! - **Constant index**: per-unit storage with atomic unit replacement,
//!   stepped full rebuilds and source-priority lookup
//! - **Whole-word matching**: overlap-aware identifier search in a line
//! - **Line annotation**: resolved values and right-to-left overlay layout
//! - **Change detection**: SHA-256 fingerprints skip unchanged units
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use constviz_core::prelude::*;
//!
//! let project = Constviz::new("/path/to/solution").index()?;
//! for a in annotate_line(&project.index, "var x = Limits.MAX;", "Program.cs") {
//!     println!("{} = {}", a.identifier, a.display);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`matcher`]: first-occurrence and whole-word search
//! - [`common`]: qualifier hints and scope paths
//! - [`extract`]: C# and Visual Basic declaration scanners
//! - [`index`]: the constant index and its rebuild job
//! - [`annotate`]: per-line annotations and overlay layout
//! - [`scan`]: parallel file discovery
//! - [`cache`]: content fingerprints
//! - [`builder`]: fluent project indexing
//! - [`error`]: typed error handling

pub mod annotate;
pub mod builder;
pub mod cache;
pub mod common;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod logging;
pub mod matcher;
pub mod prelude;
pub mod report;
pub mod scan;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{ConstvizError, ConstvizResult, IoResultExt};

// Builder API
pub use builder::{Constviz, ProjectIndex};

// Cache
pub use cache::{hash_bytes, UnitCache};

// Configuration
pub use config::{load_config, ConstvizConfig, LanguageConfig, LoggingConfig, ScanConfig};

// Extraction
pub use extract::{is_generated_path, DeclarationSource, SourceUnit};

// Index
pub use index::{
    normalize_value, ConstantIndex, ConstantRecord, DeclarationDescriptor, IndexState, RebuildJob,
    RebuildStep, RebuildSummary, SkipReason, StepResult, UnitOutcome,
};

// Matching
pub use matcher::{find_all_whole_word, find_first, is_valid_boundary, FirstMatch, MatchCandidate};

// Annotation
pub use annotate::{
    annotate_line, layout_right_to_left, LineAnnotation, LineAnnotator, DEFAULT_OVERLAY_PADDING,
};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Reporting
pub use report::{print_annotations_plain, print_json, print_records_plain, print_summary_plain};

// File scanning
pub use scan::{gather_source_files, load_unit, load_units};

#[cfg(test)]
mod tests;
