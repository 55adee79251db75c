//! Whole-word matching of known identifiers inside a line of text.
//!
//! Pure text scanning: no knowledge of constants or scopes.
//!
//! - [`find_first`]: earliest candidate occurrence, shortest-wins on ties
//! - [`find_all_whole_word`]: every boundary-valid occurrence, overlap aware
//! - [`is_valid_boundary`]: identifier-continuation test on the neighbours
//!
//! # Example
//!
//! ```
//! use constviz_core::matcher::find_all_whole_word;
//!
//! let found = find_all_whole_word("[bcd] ghi)jkl", &["bcd", "bc", "bcd", "sded", "ghi"]);
//! let offsets: Vec<_> = found.iter().map(|m| (m.offset, m.text)).collect();
//! assert_eq!(offsets, vec![(1, "bcd"), (6, "ghi")]);
//! ```

pub mod boundary;
pub mod word_matcher;

pub use boundary::is_valid_boundary;
pub use word_matcher::{find_all_whole_word, find_first, FirstMatch, MatchCandidate};
