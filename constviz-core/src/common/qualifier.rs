//! Qualifier hints captured from a line and matched against recorded paths.

use super::scope_path::QUALIFIER_SEPARATOR;

/// Characters that end a qualifier when walking left from a match.
pub const QUALIFIER_DELIMITERS: &[char] = &[' ', ':', ',', '"', '(', ')', '{', '}', '[', ']'];

/// Text written in front of the match at byte `offset`, back to the nearest
/// delimiter, with trailing dots removed.
///
/// `"x = Acme.Limits.MAX"` with the offset of `MAX` gives `"Acme.Limits"`.
pub fn qualifier_hint(line: &str, offset: usize) -> &str {
    let Some(head) = line.get(..offset) else {
        return "";
    };
    let start = head
        .rfind(QUALIFIER_DELIMITERS)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    head[start..].trim_end_matches(QUALIFIER_SEPARATOR)
}

/// Whether a recorded qualification is compatible with a hint.
///
/// The empty hint matches everything. Otherwise the hint must be the whole
/// qualification or a dot-aligned suffix of it, so `Limits` matches
/// `Acme.Limits` but not `Acme.OtherLimits`.
pub fn qualification_matches(qualification: &str, hint: &str) -> bool {
    if hint.is_empty() || qualification == hint {
        return true;
    }
    qualification
        .strip_suffix(hint)
        .is_some_and(|rest| rest.ends_with(QUALIFIER_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint_for<'a>(line: &'a str, word: &str) -> &'a str {
        let offset = line.find(word).unwrap();
        qualifier_hint(line, offset)
    }

    #[test]
    fn test_hint_unqualified() {
        assert_eq!(hint_for("var x = MAX;", "MAX"), "");
        assert_eq!(hint_for("MAX", "MAX"), "");
    }

    #[test]
    fn test_hint_qualified() {
        assert_eq!(hint_for("var x = Limits.MAX;", "MAX"), "Limits");
        assert_eq!(hint_for("Call(Acme.Limits.MAX)", "MAX"), "Acme.Limits");
        assert_eq!(hint_for("[Route(Routes.Home)]", "Home"), "Routes");
    }

    #[test]
    fn test_hint_stops_at_each_delimiter() {
        for delim in QUALIFIER_DELIMITERS {
            let line = format!("a{delim}Limits.MAX");
            assert_eq!(hint_for(&line, "MAX"), "Limits", "delimiter {delim:?}");
        }
    }

    #[test]
    fn test_hint_global_alias() {
        assert_eq!(hint_for("global::Acme.Limits.MAX", "MAX"), "Acme.Limits");
    }

    #[test]
    fn test_hint_out_of_range_offset() {
        assert_eq!(qualifier_hint("abc", 10), "");
    }

    #[test]
    fn test_matches_empty_hint() {
        assert!(qualification_matches("Acme.Limits", ""));
        assert!(qualification_matches("", ""));
    }

    #[test]
    fn test_matches_exact_and_suffix() {
        assert!(qualification_matches("Acme.Limits", "Acme.Limits"));
        assert!(qualification_matches("Acme.Limits", "Limits"));
        assert!(qualification_matches("Acme.Api.Limits", "Api.Limits"));
    }

    #[test]
    fn test_matches_is_segment_aligned() {
        assert!(!qualification_matches("XFoo.Bar", "Foo.Bar"));
        assert!(!qualification_matches("Acme.OtherLimits", "Limits"));
        assert!(!qualification_matches("", "Limits"));
    }
}
