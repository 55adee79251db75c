//! Visual Basic constant declaration scanner.
//!
//! Visual Basic is line oriented: the token stream is cut into logical
//! statements at newlines and `:` separators, with `_` continuations
//! already folded away by the lexer. Block scopes open on a `Namespace`,
//! `Class`, `Structure`, `Module` or `Interface` statement and close on
//! the matching `End` statement. Keywords are case-insensitive.

use logos::Logos;

use super::lexer::{lex, Lexeme};
use crate::common::{Scope, ScopeKind, ScopePathBuilder};
use crate::error::{ConstvizError, ConstvizResult};
use crate::index::DeclarationDescriptor;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VbToken {
    #[regex(r"[ \t\f\x0B\x{A0}]+")]
    Whitespace,

    #[regex(r"_[ \t]*(\r\n|\n|\r)")]
    LineContinuation,

    #[regex(r"\r\n|\n|\r")]
    Newline,

    #[regex(r"'[^\r\n]*")]
    #[regex(r"[Rr][Ee][Mm]([ \t][^\r\n]*)?")]
    Comment,

    #[regex(r"#[ \t]*[A-Za-z][^\r\n]*")]
    Directive,

    #[regex(r"#[ \t]*[0-9][^#\r\n]*#")]
    DateLiteral,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"\[[A-Za-z_][A-Za-z0-9_]*\]")]
    EscapedIdent,

    #[regex(r#""([^"\r\n]|"")*"[cC]?"#)]
    Str,

    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9][0-9A-Za-z_]*)?")]
    Number,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(":=")]
    NamedArg,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[regex(r"<[=>]|>=")]
    Operator,

    #[regex(r#"[^\sA-Za-z0-9_"']"#, priority = 1)]
    Punct,
}

fn is_trivia(kind: &VbToken) -> bool {
    matches!(
        kind,
        VbToken::Whitespace | VbToken::LineContinuation | VbToken::Comment | VbToken::Directive
    )
}

/// Statement prefixes that never change what the statement declares.
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "friend",
    "protected",
    "shared",
    "shadows",
    "partial",
    "mustinherit",
    "notinheritable",
    "overloads",
    "overrides",
    "readonly",
    "static",
    "dim",
    "withevents",
    "widening",
    "narrowing",
    "default",
    "async",
    "iterator",
];

/// Block statements that open a qualifying scope.
fn block_kind(word: &str) -> Option<ScopeKind> {
    if word.eq_ignore_ascii_case("namespace") {
        return Some(ScopeKind::Namespace);
    }
    ["class", "structure", "module", "interface"]
        .iter()
        .any(|k| word.eq_ignore_ascii_case(k))
        .then_some(ScopeKind::Type)
}

fn is_keyword(word: &str, keyword: &str) -> bool {
    word.eq_ignore_ascii_case(keyword)
}

struct VisualBasicExtractor<'s> {
    source_id: &'s str,
    text: &'s str,
    scopes: Vec<Scope>,
    results: Vec<DeclarationDescriptor>,
}

impl ScopePathBuilder for VisualBasicExtractor<'_> {
    fn scopes(&self) -> &[Scope] {
        &self.scopes
    }
}

impl<'s> VisualBasicExtractor<'s> {
    fn word(&self, token: &Lexeme<VbToken>) -> &'s str {
        token.text(self.text)
    }

    /// Identifier text, without the brackets of an escaped name.
    fn name(&self, token: &Lexeme<VbToken>) -> Option<&'s str> {
        match token.kind {
            VbToken::Ident => Some(self.word(token)),
            VbToken::EscapedIdent => {
                let word = self.word(token);
                Some(&word[1..word.len() - 1])
            }
            _ => None,
        }
    }

    fn run(mut self, tokens: &[Lexeme<VbToken>]) -> ConstvizResult<Vec<DeclarationDescriptor>> {
        for statement in tokens.split(|t| matches!(t.kind, VbToken::Newline | VbToken::Colon)) {
            self.statement(statement)?;
        }
        Ok(self.results)
    }

    fn statement(&mut self, tokens: &[Lexeme<VbToken>]) -> ConstvizResult<()> {
        let mut rest = skip_attributes(tokens);
        while let Some((first, tail)) = rest.split_first() {
            let is_modifier = first.kind == VbToken::Ident
                && MODIFIERS.iter().any(|m| is_keyword(self.word(first), m));
            if !is_modifier {
                break;
            }
            rest = tail;
        }

        let Some((head, tail)) = rest.split_first() else {
            return Ok(());
        };
        if head.kind != VbToken::Ident {
            return Ok(());
        }
        let head_word = self.word(head);

        if is_keyword(head_word, "end") {
            if let Some(kind) = tail.first().and_then(|t| block_kind(self.word(t))) {
                self.close_block(kind, head)?;
            }
        } else if is_keyword(head_word, "const") {
            self.constants(tail);
        } else if let Some(kind) = block_kind(head_word) {
            self.open_block(kind, tail);
        }
        Ok(())
    }

    fn open_block(&mut self, kind: ScopeKind, tail: &[Lexeme<VbToken>]) {
        let name = match kind {
            ScopeKind::Namespace => self.dotted_name(tail),
            _ => tail
                .first()
                .and_then(|t| self.name(t))
                .map(str::to_string)
                .unwrap_or_default(),
        };
        if name.is_empty() {
            return;
        }
        self.scopes.push(Scope { kind, name });
    }

    fn close_block(&mut self, kind: ScopeKind, at: &Lexeme<VbToken>) -> ConstvizResult<()> {
        match self.scopes.last() {
            Some(open) if open.kind == kind => {
                self.scopes.pop();
                Ok(())
            }
            _ => Err(ConstvizError::extraction_at(
                self.source_id,
                "unbalanced End statement",
                at.start,
                &self.text[at.start..],
            )),
        }
    }

    fn dotted_name(&self, tokens: &[Lexeme<VbToken>]) -> String {
        let mut name = String::new();
        for token in tokens {
            match token.kind {
                VbToken::Dot if !name.is_empty() => name.push('.'),
                _ => match self.name(token) {
                    Some(part) => name.push_str(part),
                    None => break,
                },
            }
        }
        name.trim_end_matches('.').to_string()
    }

    /// `Const A As Integer = 1, B = 2`, one descriptor per declarator.
    fn constants(&mut self, tokens: &[Lexeme<VbToken>]) {
        let qualification = self.build_qualification();
        for declarator in split_top_level(tokens) {
            let Some(name) = declarator.first().and_then(|t| self.name(t)) else {
                continue;
            };
            let initializer = declarator
                .iter()
                .position(|t| t.kind == VbToken::Eq)
                .map(|eq| match (declarator.get(eq + 1), declarator.last()) {
                    (Some(first), Some(last)) => self.text[first.start..last.end].to_string(),
                    _ => String::new(),
                });
            self.results.push(DeclarationDescriptor::constant(
                name,
                qualification.as_str(),
                initializer,
            ));
        }
    }
}

/// Skips a leading `<Attribute(...)>` list.
fn skip_attributes(tokens: &[Lexeme<VbToken>]) -> &[Lexeme<VbToken>] {
    if tokens.first().map(|t| t.kind) != Some(VbToken::Lt) {
        return tokens;
    }
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            VbToken::Lt => depth += 1,
            VbToken::Gt => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &tokens[i + 1..];
                }
            }
            _ => {}
        }
    }
    &[]
}

/// Splits on commas outside any parentheses or braces.
fn split_top_level(tokens: &[Lexeme<VbToken>]) -> Vec<&[Lexeme<VbToken>]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            VbToken::LParen | VbToken::LBrace => depth += 1,
            VbToken::RParen | VbToken::RBrace => depth = depth.saturating_sub(1),
            VbToken::Comma if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Extracts all `Const` declarations from Visual Basic source text.
pub fn extract_declarations(
    source_id: &str,
    text: &str,
) -> ConstvizResult<Vec<DeclarationDescriptor>> {
    let tokens = lex(source_id, text, is_trivia)?;
    VisualBasicExtractor {
        source_id,
        text,
        scopes: Vec::with_capacity(8),
        results: Vec::new(),
    }
    .run(&tokens)
}
