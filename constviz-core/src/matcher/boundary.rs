//! Word-boundary rules for identifier matches.

/// Placeholder used for a neighbour that falls outside the line.
pub const BOUNDARY_PLACEHOLDER: char = ' ';

/// Whether a match surrounded by `before` and `after` is a whole word.
///
/// Identifiers start with a letter, `_` or an `@` escape prefix and continue
/// with letters, digits or `_`. So `@` rejects a match only when it sits
/// in front of it.
#[inline]
pub fn is_valid_boundary(before: char, after: char) -> bool {
    let continues_before = before.is_alphanumeric() || before == '_' || before == '@';
    let continues_after = after.is_alphanumeric() || after == '_';
    !continues_before && !continues_after
}

/// Character directly before byte `offset`, or the placeholder at line start.
#[inline]
pub(crate) fn char_before(text: &str, offset: usize) -> char {
    text.get(..offset)
        .and_then(|head| head.chars().next_back())
        .unwrap_or(BOUNDARY_PLACEHOLDER)
}

/// Character starting at byte `offset`, or the placeholder at line end.
#[inline]
pub(crate) fn char_at(text: &str, offset: usize) -> char {
    text.get(offset..)
        .and_then(|tail| tail.chars().next())
        .unwrap_or(BOUNDARY_PLACEHOLDER)
}
