//! Constant records and the declaration descriptors they are built from.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A known constant: an identifier bound to a literal value in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstantRecord {
    /// Bare declared name
    pub identifier: String,
    /// Dotted scope path, empty for top-level locals
    pub qualification: String,
    /// Normalized initializer text
    pub value: String,
    /// Originating source unit (file path)
    pub source: String,
}

impl ConstantRecord {
    /// Fully qualified name, `Qualification.Identifier`.
    pub fn qualified_name(&self) -> String {
        if self.qualification.is_empty() {
            self.identifier.clone()
        } else {
            format!("{}.{}", self.qualification, self.identifier)
        }
    }
}

/// A declaration as reported by a syntax provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationDescriptor {
    pub identifier: String,
    pub qualification: String,
    /// Raw initializer text, `None` when the declaration has none
    pub initializer: Option<String>,
    /// Declared with the `const` / `Const` modifier
    pub is_const: bool,
}

impl DeclarationDescriptor {
    /// Descriptor for a `const` declaration.
    pub fn constant(
        identifier: impl Into<String>,
        qualification: impl Into<String>,
        initializer: Option<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            qualification: qualification.into(),
            initializer,
            is_const: true,
        }
    }

    /// Whether this declaration may enter the index.
    pub fn is_eligible(&self) -> bool {
        self.is_const && self.initializer.is_some() && !self.identifier.is_empty()
    }

    /// Converts an eligible descriptor into a record for `source`.
    pub fn into_record(self, source: &str) -> Option<ConstantRecord> {
        if !self.is_eligible() {
            return None;
        }
        let initializer = self.initializer?;
        Some(ConstantRecord {
            identifier: self.identifier,
            qualification: self.qualification,
            value: normalize_value(&initializer),
            source: source.to_string(),
        })
    }
}

/// Pre-compiled `nameof(...)` pattern, prefix matched case-insensitively.
fn nameof_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: This regex pattern is hardcoded and covered by tests.
    REGEX.get_or_init(|| Regex::new(r"(?s)^(?i:nameof)\((.*)\)$").expect("Hardcoded regex pattern is valid"))
}

/// Normalizes initializer text for display.
///
/// Escaped double quotes become literal quotes, and `nameof(X)` becomes `X`
/// verbatim without further evaluation.
pub fn normalize_value(raw: &str) -> String {
    let unescaped = raw.replace("\\\"", "\"");
    match nameof_regex().captures(&unescaped) {
        Some(caps) => caps
            .get(1)
            .map(|inner| inner.as_str().to_string())
            .unwrap_or_default(),
        None => unescaped,
    }
}
