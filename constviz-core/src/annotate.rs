//! Per-line annotations: which identifiers in a line of editor text are
//! known constants, and what value to show next to each.

use serde::Serialize;

use crate::common::qualifier_hint;
use crate::index::ConstantIndex;
use crate::matcher::find_all_whole_word;

/// Gap kept between an overlay and the one to its right.
pub const DEFAULT_OVERLAY_PADDING: f64 = 5.0;

/// Markers of a line that declares a constant itself.
const DECLARATION_MARKERS: &[&str] = &[" const ", " Const "];

/// A resolved constant reference in a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineAnnotation {
    /// Byte offset of the identifier in the line
    pub offset: usize,
    pub identifier: String,
    /// Normalized value to display
    pub display: String,
}

/// Annotates `line` as seen in `source_id`.
///
/// Returns nothing while the index is unready or empty. Only the first
/// physical line of `line` is considered.
pub fn annotate_line(index: &ConstantIndex, line: &str, source_id: &str) -> Vec<LineAnnotation> {
    LineAnnotator::new(index).annotate(line, source_id)
}

/// Annotates many lines against one index, computing the candidate set once.
pub struct LineAnnotator<'i> {
    index: &'i ConstantIndex,
    candidates: Vec<&'i str>,
}

impl<'i> LineAnnotator<'i> {
    pub fn new(index: &'i ConstantIndex) -> Self {
        let candidates = if index.is_ready() {
            index.candidates()
        } else {
            Vec::new()
        };
        Self { index, candidates }
    }

    pub fn annotate(&self, line: &str, source_id: &str) -> Vec<LineAnnotation> {
        if !self.index.is_ready() || self.candidates.is_empty() {
            return Vec::new();
        }

        let line = line.lines().next().unwrap_or_default();
        if DECLARATION_MARKERS.iter().any(|m| line.contains(m)) {
            return Vec::new();
        }

        find_all_whole_word(line, &self.candidates)
            .into_iter()
            .filter(|m| !is_call_or_quoted(line, m.offset, m.text.len()))
            .filter_map(|m| {
                let hint = qualifier_hint(line, m.offset);
                let display = self.index.resolve(m.text, hint, source_id)?;
                if display.trim().is_empty() {
                    return None;
                }
                Some(LineAnnotation {
                    offset: m.offset,
                    identifier: m.text.to_string(),
                    display: display.to_string(),
                })
            })
            .collect()
    }
}

/// `MAX()` is a call, `"MAX"` is text.
fn is_call_or_quoted(line: &str, offset: usize, len: usize) -> bool {
    let after = &line[offset + len..];
    after.starts_with("()") || after.starts_with('"') || line[..offset].ends_with('"')
}

/// Maximum widths for overlays placed at `lefts`, laid out right to left.
///
/// The rightmost overlay is unconstrained (`None`); every other one may
/// extend up to `padding` short of its right neighbour. Widths never go
/// negative.
pub fn layout_right_to_left(lefts: &[f64], padding: f64) -> Vec<Option<f64>> {
    let mut order: Vec<usize> = (0..lefts.len()).collect();
    order.sort_by(|&a, &b| lefts[b].total_cmp(&lefts[a]));

    let mut widths = vec![None; lefts.len()];
    let mut previous_left: Option<f64> = None;
    for i in order {
        let left = lefts[i];
        widths[i] = previous_left.map(|prev| (prev - left - padding).max(0.0));
        previous_left = Some(left);
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstvizConfig;
    use crate::extract::{DeclarationSource, SourceUnit};

    fn ready_index() -> ConstantIndex {
        let mut index = ConstantIndex::new();
        index
            .rebuild_all(
                vec![SourceUnit::new(
                    "Limits.cs",
                    DeclarationSource::CSharp,
                    r#"namespace Acme
{
    class Limits
    {
        public const int MAX = 10;
        public const string Greeting = "say \"hi\"";
    }
}"#,
                )],
                &ConstvizConfig::default(),
            )
            .unwrap();
        index
    }

    fn pairs(found: &[LineAnnotation]) -> Vec<(usize, &str, &str)> {
        found
            .iter()
            .map(|a| (a.offset, a.identifier.as_str(), a.display.as_str()))
            .collect()
    }

    #[test]
    fn test_annotates_qualified_and_bare_references() {
        let index = ready_index();
        let line = "var x = Limits.MAX + MAX;";
        let found = annotate_line(&index, line, "Program.cs");
        assert_eq!(pairs(&found), vec![(15, "MAX", "10"), (21, "MAX", "10")]);
    }

    #[test]
    fn test_display_is_normalized() {
        let index = ready_index();
        let found = annotate_line(&index, "Print(Greeting);", "Program.cs");
        assert_eq!(pairs(&found), vec![(6, "Greeting", "\"say \"hi\"\"")]);
    }

    #[test]
    fn test_wrong_qualifier_is_dropped() {
        let index = ready_index();
        assert!(annotate_line(&index, "var x = Other.MAX;", "Program.cs").is_empty());
        assert_eq!(annotate_line(&index, "var x = Acme.Limits.MAX;", "Program.cs").len(), 1);
    }

    #[test]
    fn test_filters() {
        let index = ready_index();
        assert!(annotate_line(&index, "    public const int Y = MAX;", "a.cs").is_empty());
        assert!(annotate_line(&index, "Call(MAX());", "a.cs").is_empty());
        assert!(annotate_line(&index, "Log(\"MAX\");", "a.cs").is_empty());
        assert!(annotate_line(&index, "var MAXIMUM = 1;", "a.cs").is_empty());
    }

    #[test]
    fn test_only_first_line_is_used() {
        let index = ready_index();
        let found = annotate_line(&index, "a = MAX;\r\nb = MAX;", "a.cs");
        assert_eq!(pairs(&found), vec![(4, "MAX", "10")]);
    }

    #[test]
    fn test_unready_or_empty_index_annotates_nothing() {
        let empty = ConstantIndex::new();
        assert!(annotate_line(&empty, "x = MAX;", "a.cs").is_empty());

        let mut ready_empty = ConstantIndex::new();
        ready_empty
            .rebuild_all(Vec::<SourceUnit>::new(), &ConstvizConfig::default())
            .unwrap();
        assert!(annotate_line(&ready_empty, "x = MAX;", "a.cs").is_empty());
    }

    #[test]
    fn test_annotator_reuses_candidates() {
        let index = ready_index();
        let annotator = LineAnnotator::new(&index);
        assert_eq!(annotator.annotate("a(MAX)", "x.cs").len(), 1);
        assert_eq!(annotator.annotate("b(Greeting, MAX)", "x.cs").len(), 2);
        assert!(annotator.annotate("nothing here", "x.cs").is_empty());
    }

    #[test]
    fn test_layout_right_to_left() {
        assert_eq!(
            layout_right_to_left(&[0.0, 50.0, 120.0], DEFAULT_OVERLAY_PADDING),
            vec![Some(45.0), Some(65.0), None]
        );
        assert_eq!(layout_right_to_left(&[30.0], 5.0), vec![None]);
        assert!(layout_right_to_left(&[], 5.0).is_empty());
    }

    #[test]
    fn test_layout_clamps_crowded_overlays() {
        assert_eq!(layout_right_to_left(&[0.0, 3.0], 5.0), vec![Some(0.0), None]);
        // Input order does not matter, widths follow position.
        assert_eq!(
            layout_right_to_left(&[120.0, 0.0, 50.0], 5.0),
            vec![None, Some(45.0), Some(65.0)]
        );
    }
}
