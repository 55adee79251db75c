//! First-occurrence search and whole-word scanning over a single line.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use super::boundary::{char_at, char_before, is_valid_boundary};

/// Result of [`find_first`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstMatch<'c> {
    /// Byte offset of the match in the searched text
    pub offset: usize,
    /// The candidate that matched
    pub text: &'c str,
    /// More than one distinct candidate starts at `offset`
    pub retry: bool,
}

/// A whole-word occurrence of a candidate in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchCandidate<'c> {
    /// Byte offset into the scanned line
    pub offset: usize,
    /// The matched candidate
    pub text: &'c str,
}

/// Distinct, non-empty candidates in first-seen order.
fn distinct_candidates<'c, S: AsRef<str>>(text: &str, candidates: &'c [S]) -> Vec<&'c str> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut distinct = Vec::with_capacity(candidates.len());
    let mut empty = 0usize;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate.is_empty() {
            empty += 1;
            continue;
        }
        if seen.insert(candidate) {
            distinct.push(candidate);
        }
    }

    if empty > 0 {
        warn!(
            event = "matcher_empty_candidate",
            count = empty,
            line = %text,
            "ignoring empty match candidates"
        );
    }

    distinct
}

/// Picks the earliest hit, shortest candidate first among equal offsets.
///
/// Two distinct candidates with the same offset and length cannot both match,
/// so the choice never depends on iteration order.
fn pick_first<'c>(hits: impl IntoIterator<Item = (usize, &'c str)>) -> Option<FirstMatch<'c>> {
    let mut best: Option<(usize, &'c str)> = None;
    let mut ties = 0usize;

    for (offset, candidate) in hits {
        match best {
            Some((best_offset, _)) if offset > best_offset => {}
            Some((best_offset, best_text)) if offset == best_offset => {
                ties += 1;
                if candidate.len() < best_text.len() {
                    best = Some((offset, candidate));
                }
            }
            _ => {
                best = Some((offset, candidate));
                ties = 1;
            }
        }
    }

    best.map(|(offset, text)| FirstMatch {
        offset,
        text,
        retry: ties > 1,
    })
}

/// Finds the first occurrence of any candidate in `text`.
///
/// Search is exact and case-sensitive. Duplicate candidates are tolerated.
/// Returns `None` when no candidate occurs.
pub fn find_first<'c, S: AsRef<str>>(text: &str, candidates: &'c [S]) -> Option<FirstMatch<'c>> {
    let distinct = distinct_candidates(text, candidates);
    pick_first(
        distinct
            .into_iter()
            .filter_map(|candidate| text.find(candidate).map(|offset| (offset, candidate))),
    )
}

/// Finds every whole-word occurrence of any candidate in `text`.
///
/// The scan restarts one character after each match rather than after the
/// whole match, and a match that shares its start with another candidate is
/// re-evaluated at the same offset with the matched candidate excluded, so
/// overlapping names are all considered. Results are in ascending offset order.
pub fn find_all_whole_word<'c, S: AsRef<str>>(
    text: &str,
    candidates: &'c [S],
) -> Vec<MatchCandidate<'c>> {
    let distinct = distinct_candidates(text, candidates);
    let mut result = Vec::new();
    if distinct.is_empty() {
        return result;
    }

    // Next absolute occurrence of each candidate at or after `start`.
    // `None` is final: the searched suffix only ever shrinks.
    let mut next_at: Vec<Option<usize>> = distinct.iter().map(|&c| text.find(c)).collect();
    let mut excluded = vec![false; distinct.len()];
    let mut start = 0usize;

    while start <= text.len() {
        for (slot, &candidate) in next_at.iter_mut().zip(&distinct) {
            if let Some(pos) = *slot {
                if pos < start {
                    *slot = text[start..].find(candidate).map(|rel| start + rel);
                }
            }
        }

        let hits = (0..distinct.len())
            .filter(|&i| !excluded[i])
            .filter_map(|i| next_at[i].map(|pos| (pos, distinct[i])));

        let Some(found) = pick_first(hits) else {
            break;
        };

        let before = char_before(text, found.offset);
        let after = char_at(text, found.offset + found.text.len());
        if is_valid_boundary(before, after) {
            result.push(MatchCandidate {
                offset: found.offset,
                text: found.text,
            });
        }

        if found.retry {
            if let Some(idx) = distinct.iter().position(|c| *c == found.text) {
                excluded[idx] = true;
            }
        } else {
            excluded.iter_mut().for_each(|e| *e = false);
            // found.text is non-empty, so a char starts at found.offset
            start = found.offset + char_at(text, found.offset).len_utf8();
        }
    }

    result
}
