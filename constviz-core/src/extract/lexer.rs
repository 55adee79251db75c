//! Shared driver for the logos token scanners.

use logos::Logos;

use crate::error::{ConstvizError, ConstvizResult};

/// A significant token: its kind and byte span in the unit text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lexeme<K> {
    pub kind: K,
    pub start: usize,
    pub end: usize,
}

impl<K> Lexeme<K> {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Tokenizes `text`, dropping trivia.
///
/// The first input the scanner cannot tokenize (typically an unterminated
/// string) fails the whole unit.
pub(crate) fn lex<'s, K>(
    source_id: &str,
    text: &'s str,
    is_trivia: fn(&K) -> bool,
) -> ConstvizResult<Vec<Lexeme<K>>>
where
    K: Logos<'s, Source = str>,
    K::Extras: Default,
{
    let mut lexer = K::lexer(text);
    let mut tokens = Vec::with_capacity(text.len() / 4);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) if is_trivia(&kind) => {}
            Ok(kind) => tokens.push(Lexeme {
                kind,
                start: span.start,
                end: span.end,
            }),
            Err(_) => {
                let rest = &text[span.start..];
                return Err(ConstvizError::extraction_at(
                    source_id,
                    describe_lex_error(rest),
                    span.start,
                    rest,
                ));
            }
        }
    }

    Ok(tokens)
}

fn describe_lex_error(rest: &str) -> &'static str {
    if rest.starts_with("/*") {
        return "unterminated block comment";
    }
    match rest.chars().next() {
        Some('"') => "unterminated string literal",
        Some('\'') => "unterminated character literal",
        _ => "unexpected input",
    }
}
