//! Scope-path building for declaration extraction.

/// Separator between scope names in a qualification.
pub const QUALIFIER_SEPARATOR: char = '.';

/// Kind of an enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// `namespace` / `Namespace` block, its name may already be dotted
    Namespace,
    /// Class, struct, interface, record or module
    Type,
    /// Any other block (method body, accessor, initializer...)
    Block,
}

/// One entry of an extractor's scope stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
}

impl Scope {
    pub fn namespace(name: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::Namespace,
            name: name.into(),
        }
    }

    pub fn type_scope(name: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::Type,
            name: name.into(),
        }
    }

    pub fn block() -> Self {
        Self {
            kind: ScopeKind::Block,
            name: String::new(),
        }
    }

    /// Whether this scope contributes a segment to the qualification.
    pub fn is_qualifying(&self) -> bool {
        !matches!(self.kind, ScopeKind::Block) && !self.name.is_empty()
    }
}

/// Trait for building qualifications from the current scope stack.
///
/// Implement this on extractors that track enclosing scopes while walking
/// a token stream, outermost scope first.
pub trait ScopePathBuilder {
    /// Returns the current scope stack, outermost first.
    fn scopes(&self) -> &[Scope];

    /// Builds the dotted qualification of the current position.
    ///
    /// # Example
    /// For scopes `[Namespace("Acme.Api"), Type("Routes"), Block]` this
    /// returns `"Acme.Api.Routes"`.
    fn build_qualification(&self) -> String {
        let mut result = String::new();
        for scope in self.scopes().iter().filter(|s| s.is_qualifying()) {
            if !result.is_empty() {
                result.push(QUALIFIER_SEPARATOR);
            }
            result.push_str(&scope.name);
        }
        result
    }
}
