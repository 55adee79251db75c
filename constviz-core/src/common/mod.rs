//! Qualifier and scope-path utilities shared by the extractors, the index
//! and the annotation pass.

mod qualifier;
mod scope_path;

pub use qualifier::{qualification_matches, qualifier_hint, QUALIFIER_DELIMITERS};
pub use scope_path::{Scope, ScopeKind, ScopePathBuilder, QUALIFIER_SEPARATOR};
