//! The constant index: every known constant across the project.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │     record.rs       │     │     rebuild.rs      │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  Records, decl      │     │  Resumable full     │
//! │  descriptors, value │     │  rebuild, one unit  │
//! │  normalization      │     │  per step           │
//! └──────────┬──────────┘     └──────────┬──────────┘
//!            │                           │
//!            └───────────┬───────────────┘
//!                        ▼
//!            ┌─────────────────────┐
//!            │  constant_index.rs  │
//!            │  ─────────────────  │
//!            │  Per-unit storage,  │
//!            │  update, resolve    │
//!            └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use constviz_core::config::ConstvizConfig;
//! use constviz_core::extract::{DeclarationSource, SourceUnit};
//! use constviz_core::index::ConstantIndex;
//!
//! let unit = SourceUnit::new(
//!     "Limits.cs",
//!     DeclarationSource::CSharp,
//!     "namespace Acme { class Limits { public const int MAX = 10; } }",
//! );
//!
//! let mut index = ConstantIndex::new();
//! index.rebuild_all(vec![unit], &ConstvizConfig::default()).unwrap();
//!
//! assert_eq!(index.resolve("MAX", "Limits", "Other.cs"), Some("10"));
//! ```

pub mod constant_index;
pub mod rebuild;
pub mod record;

pub use constant_index::{ConstantIndex, IndexState, SkipReason, UnitOutcome};
pub use rebuild::{RebuildJob, RebuildStep, RebuildSummary, StepResult};
pub use record::{normalize_value, ConstantRecord, DeclarationDescriptor};
