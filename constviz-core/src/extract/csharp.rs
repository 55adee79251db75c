//! C# constant declaration scanner.
//!
//! Token-level, not a parser: it tracks brace scopes, names the ones opened
//! by `namespace` and type declarations, and reads the declarators that
//! follow each `const` keyword.

use logos::Logos;

use super::lexer::{lex, Lexeme};
use crate::common::{Scope, ScopeKind, ScopePathBuilder};
use crate::error::{ConstvizError, ConstvizResult};
use crate::index::DeclarationDescriptor;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CsToken {
    #[regex(r"\s+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"#[^\n]*")]
    Directive,

    #[regex(r"@?[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"@"([^"]|"")*""#)]
    #[regex(r#"\$"([^"\\\n]|\\.)*""#)]
    #[regex(r#"(\$@|@\$)"([^"]|"")*""#)]
    #[token(r#"""""#, raw_string)]
    Str,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char,

    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9][0-9A-Za-z_]*)?")]
    Number,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token(".")]
    Dot,

    #[regex(r"[=!<>]=|=>")]
    Operator,

    #[regex(r#"[^\sA-Za-z0-9_"']"#, priority = 1)]
    Punct,
}

/// Consumes a block comment up to and including its `*/`.
fn block_comment(lex: &mut logos::Lexer<CsToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

/// Consumes a raw string literal. The opening run of three or more quotes
/// is the fence that must close it.
fn raw_string(lex: &mut logos::Lexer<CsToken>) -> bool {
    let rest = lex.remainder();
    let extra = rest.bytes().take_while(|&b| b == b'"').count();
    let fence = "\"".repeat(3 + extra);
    match rest[extra..].find(&fence) {
        Some(at) => {
            lex.bump(extra + at + fence.len());
            true
        }
        None => false,
    }
}

fn is_trivia(kind: &CsToken) -> bool {
    matches!(
        kind,
        CsToken::Whitespace | CsToken::LineComment | CsToken::BlockComment | CsToken::Directive
    )
}

/// Words that open a named type scope.
const TYPE_KEYWORDS: &[&str] = &["class", "struct", "interface", "record"];

/// Keywords that can follow a type keyword without being its name
/// (`where T : class, new()`, `record struct`).
const NOT_A_TYPE_NAME: &[&str] = &[
    "class", "struct", "interface", "record", "new", "where", "unmanaged", "notnull",
];

/// Identifier text without the `@` verbatim prefix.
fn value_text(raw: &str) -> &str {
    raw.strip_prefix('@').unwrap_or(raw)
}

/// How a declarator header or initializer ended.
enum Terminator {
    /// Another declarator follows
    Comma,
    /// End of the declaration
    Semi,
    /// Braces or end of input: the declaration is malformed
    Abort,
}

struct CSharpExtractor<'s> {
    source_id: &'s str,
    text: &'s str,
    tokens: Vec<Lexeme<CsToken>>,
    pos: usize,
    scopes: Vec<Scope>,
    /// Scopes opened by a file-scoped namespace; no brace closes them
    floor: usize,
    pending: Option<Scope>,
    results: Vec<DeclarationDescriptor>,
}

impl ScopePathBuilder for CSharpExtractor<'_> {
    fn scopes(&self) -> &[Scope] {
        &self.scopes
    }
}

impl<'s> CSharpExtractor<'s> {
    fn new(source_id: &'s str, text: &'s str, tokens: Vec<Lexeme<CsToken>>) -> Self {
        Self {
            source_id,
            text,
            tokens,
            pos: 0,
            scopes: Vec::with_capacity(8),
            floor: 0,
            pending: None,
            results: Vec::with_capacity(16),
        }
    }

    fn peek(&self, ahead: usize) -> Option<Lexeme<CsToken>> {
        self.tokens.get(self.pos + ahead).copied()
    }

    fn word(&self, token: Lexeme<CsToken>) -> &'s str {
        token.text(self.text)
    }

    fn peek_ident(&self, ahead: usize) -> Option<&'s str> {
        self.peek(ahead)
            .filter(|t| t.kind == CsToken::Ident)
            .map(|t| self.word(t))
    }

    fn run(mut self) -> ConstvizResult<Vec<DeclarationDescriptor>> {
        while let Some(token) = self.peek(0) {
            match token.kind {
                CsToken::LBrace => {
                    let scope = self.pending.take().unwrap_or_else(Scope::block);
                    self.scopes.push(scope);
                    self.pos += 1;
                }
                CsToken::RBrace => {
                    if self.scopes.len() <= self.floor {
                        return Err(ConstvizError::extraction_at(
                            self.source_id,
                            "unbalanced closing brace",
                            token.start,
                            &self.text[token.start..],
                        ));
                    }
                    self.scopes.pop();
                    self.pending = None;
                    self.pos += 1;
                }
                CsToken::Semi => {
                    self.pending = None;
                    self.pos += 1;
                }
                CsToken::Ident => match self.word(token) {
                    "namespace" => self.namespace(),
                    "const" => self.constant(),
                    word if TYPE_KEYWORDS.contains(&word) => self.type_declaration(),
                    _ => self.pos += 1,
                },
                _ => self.pos += 1,
            }
        }

        Ok(self.results)
    }

    /// `namespace A.B {` or file-scoped `namespace A.B;`
    fn namespace(&mut self) {
        self.pos += 1;
        let mut name = String::new();
        while let Some(part) = self.peek_ident(0) {
            name.push_str(value_text(part));
            self.pos += 1;
            match self.peek(0) {
                Some(t) if t.kind == CsToken::Dot => {
                    name.push('.');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if name.is_empty() {
            return;
        }

        if self.peek(0).is_some_and(|t| t.kind == CsToken::Semi) {
            self.scopes.push(Scope::namespace(name));
            self.floor = self.scopes.len();
            self.pos += 1;
        } else {
            self.pending = Some(Scope::namespace(name));
        }
    }

    /// `class Name`, `record struct Name`, ... The scope opens at the next `{`.
    fn type_declaration(&mut self) {
        let is_record = self.peek_ident(0) == Some("record");
        if is_record && !self.record_declaration_ahead() {
            self.pos += 1;
            return;
        }
        self.pos += 1;
        if let Some(next) = self.peek_ident(0) {
            if next == "class" || next == "struct" {
                self.pos += 1;
            }
        }
        if let Some(name) = self.peek_ident(0) {
            if !NOT_A_TYPE_NAME.contains(&name) {
                self.pending = Some(Scope::type_scope(value_text(name)));
                self.pos += 1;
            }
        }
    }

    /// `record` is contextual: it declares a type only outside member bodies,
    /// and only when a name followed by `{ ( : < ;` or `where` comes next.
    fn record_declaration_ahead(&self) -> bool {
        if self.scopes.last().is_some_and(|s| s.kind == ScopeKind::Block) {
            return false;
        }
        let mut ahead = 1;
        if matches!(self.peek_ident(ahead), Some("class" | "struct")) {
            ahead += 1;
        }
        match self.peek_ident(ahead) {
            Some(name) if !NOT_A_TYPE_NAME.contains(&name) => {}
            _ => return false,
        }
        let Some(next) = self.peek(ahead + 1) else {
            return false;
        };
        match next.kind {
            CsToken::LBrace | CsToken::LParen | CsToken::Semi => true,
            CsToken::Ident => self.word(next) == "where",
            CsToken::Punct => matches!(self.word(next), ":" | "<"),
            _ => false,
        }
    }

    /// `const T A = 1, B = 2;`, one descriptor per declarator.
    fn constant(&mut self) {
        self.pos += 1;
        let qualification = self.build_qualification();

        loop {
            let name = match self.declarator_header() {
                Header::Name(name) => name,
                Header::NoInitializer(name, Terminator::Comma) => {
                    self.push_constant(name, &qualification, None);
                    continue;
                }
                Header::NoInitializer(name, Terminator::Semi) => {
                    self.push_constant(name, &qualification, None);
                    return;
                }
                Header::NoInitializer(_, Terminator::Abort) => return,
            };

            let (initializer, terminator) = self.initializer();
            match terminator {
                Terminator::Comma => self.push_constant(name, &qualification, Some(initializer)),
                Terminator::Semi => {
                    self.push_constant(name, &qualification, Some(initializer));
                    return;
                }
                Terminator::Abort => return,
            }
        }
    }

    /// Reads up to and including the declarator's `=`, `,` or `;`.
    fn declarator_header(&mut self) -> Header<'s> {
        let mut name: Option<&'s str> = None;
        while let Some(token) = self.peek(0) {
            match token.kind {
                CsToken::Ident => {
                    name = Some(value_text(self.word(token)));
                    self.pos += 1;
                }
                CsToken::Eq => {
                    self.pos += 1;
                    return match name {
                        Some(name) => Header::Name(name),
                        None => Header::NoInitializer("", Terminator::Abort),
                    };
                }
                CsToken::Comma => {
                    self.pos += 1;
                    return Header::NoInitializer(name.unwrap_or(""), Terminator::Comma);
                }
                CsToken::Semi => {
                    self.pos += 1;
                    return Header::NoInitializer(name.unwrap_or(""), Terminator::Semi);
                }
                CsToken::LBrace | CsToken::RBrace => {
                    return Header::NoInitializer("", Terminator::Abort);
                }
                _ => self.pos += 1,
            }
        }
        Header::NoInitializer("", Terminator::Abort)
    }

    /// Reads an initializer expression up to its top-level `,` or `;`.
    ///
    /// Returns the trimmed source text between `=` and the terminator.
    fn initializer(&mut self) -> (String, Terminator) {
        let start = self.peek(0).map(|t| t.start).unwrap_or(self.text.len());
        let mut end = start;
        let mut depth = 0usize;

        while let Some(token) = self.peek(0) {
            match token.kind {
                CsToken::LParen | CsToken::LBracket | CsToken::LBrace => depth += 1,
                CsToken::RParen | CsToken::RBracket | CsToken::RBrace => {
                    if depth == 0 {
                        return (String::new(), Terminator::Abort);
                    }
                    depth -= 1;
                }
                CsToken::Comma | CsToken::Semi if depth == 0 => {
                    self.pos += 1;
                    let terminator = if token.kind == CsToken::Comma {
                        Terminator::Comma
                    } else {
                        Terminator::Semi
                    };
                    return (self.text[start..end].to_string(), terminator);
                }
                _ => {}
            }
            end = token.end;
            self.pos += 1;
        }

        (String::new(), Terminator::Abort)
    }

    fn push_constant(&mut self, name: &str, qualification: &str, initializer: Option<String>) {
        if name.is_empty() {
            return;
        }
        self.results.push(DeclarationDescriptor::constant(
            name,
            qualification,
            initializer,
        ));
    }
}

enum Header<'s> {
    /// Name read and `=` consumed; an initializer follows
    Name(&'s str),
    NoInitializer(&'s str, Terminator),
}

/// Extracts all `const` declarations from C# source text.
pub fn extract_declarations(
    source_id: &str,
    text: &str,
) -> ConstvizResult<Vec<DeclarationDescriptor>> {
    let tokens = lex(source_id, text, is_trivia)?;
    CSharpExtractor::new(source_id, text, tokens).run()
}
