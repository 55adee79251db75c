//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use constviz_core::prelude::*;
//! ```

// Errors
pub use crate::error::{ConstvizError, ConstvizResult};

// Index
pub use crate::index::{
    ConstantIndex, ConstantRecord, DeclarationDescriptor, IndexState, RebuildJob, RebuildStep,
    RebuildSummary, UnitOutcome,
};

// Extraction
pub use crate::extract::{DeclarationSource, SourceUnit};

// Matching and annotation
pub use crate::annotate::{annotate_line, layout_right_to_left, LineAnnotation, LineAnnotator};
pub use crate::matcher::{find_all_whole_word, find_first};

// File scanning
pub use crate::scan::{gather_source_files, load_units};

// Configuration
pub use crate::config::{load_config, ConstvizConfig};

// Builder API
pub use crate::builder::{Constviz, ProjectIndex};
