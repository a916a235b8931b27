//! Match locator.
//!
//! Finds the leftmost verbatim occurrence of a target string in a page's
//! logical text. Matching is byte-for-byte against the text the model
//! builder reconstructed: no whitespace normalization and no case folding.
//! Callers supplying text with different whitespace than what is actually
//! rendered will not match — a documented limitation, not something to
//! silently work around.
//!
//! A match that crosses a font-change boundary is refused with
//! [`Error::SplitFontMatch`](crate::Error::SplitFontMatch): it is ambiguous
//! which font should govern the replacement, and guessing would produce
//! visually wrong output. Kerning-only group boundaries within one font do
//! not split a match; they are structure the rewriter knows how to handle.

use crate::error::{Error, Result};
use crate::text::TextRunModel;

/// A located occurrence, as character offsets over the logical text.
///
/// Invariant: `start <= end <= length of logical text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    /// Offset of the first matched character
    pub start: usize,
    /// Offset one past the last matched character
    pub end: usize,
}

/// Locate the leftmost occurrence of `target` in the model's logical text.
///
/// # Errors
///
/// - [`Error::TextNotFound`] when `target` does not occur verbatim (also
///   returned for an empty target, which matches nothing meaningful)
/// - [`Error::SplitFontMatch`] when the occurrence crosses a font or size
///   change
pub fn locate(model: &TextRunModel, target: &str) -> Result<MatchSpan> {
    locate_from(model, target, 0)
}

/// Like [`locate`], but only considers occurrences starting at or after
/// character offset `from`. Used by replace-all loops to advance past the
/// text they have already rewritten.
pub fn locate_from(model: &TextRunModel, target: &str, from: usize) -> Result<MatchSpan> {
    let needle: Vec<char> = target.chars().collect();
    if needle.is_empty() {
        return Err(Error::TextNotFound(target.to_string()));
    }

    let hay = model.chars();
    if from >= hay.len() || needle.len() > hay.len() - from {
        return Err(Error::TextNotFound(target.to_string()));
    }

    let span = (from..=hay.len() - needle.len())
        .find(|&i| hay[i..i + needle.len()] == needle[..])
        .map(|start| MatchSpan {
            start,
            end: start + needle.len(),
        })
        .ok_or_else(|| Error::TextNotFound(target.to_string()))?;

    // Refuse matches that straddle a font change; kerning boundaries
    // between groups of the same font/size are fine.
    let spans = &model.spans()[span.start..span.end];
    let first = model.group(&spans[0]);
    for s in spans {
        let g = model.group(s);
        if g.font_name != first.font_name || g.font_size != first.font_size {
            return Err(Error::SplitFontMatch {
                start: span.start,
                end: span.end,
            });
        }
    }

    Ok(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tokenize;
    use crate::fonts::{FontEncoding, FontTable};

    fn model(src: &[u8]) -> TextRunModel {
        let mut fonts = FontTable::new();
        fonts.insert("F1", FontEncoding::winansi("Helvetica"));
        fonts.insert("F2", FontEncoding::winansi("Times-Roman"));
        let ops = tokenize(src).unwrap();
        TextRunModel::build(&ops, &fonts).unwrap()
    }

    #[test]
    fn test_leftmost_match_wins() {
        let m = model(b"BT /F1 12 Tf (abcabc) Tj ET");
        let span = locate(&m, "abc").unwrap();
        assert_eq!(span, MatchSpan { start: 0, end: 3 });
    }

    #[test]
    fn test_match_slice_equals_target() {
        let m = model(b"BT /F1 12 Tf (Hello World) Tj ET");
        let span = locate(&m, "lo Wo").unwrap();
        let slice: String = m.chars()[span.start..span.end].iter().collect();
        assert_eq!(slice, "lo Wo");
    }

    #[test]
    fn test_not_found() {
        let m = model(b"BT /F1 12 Tf (Hello) Tj ET");
        assert!(matches!(locate(&m, "Goodbye"), Err(Error::TextNotFound(_))));
    }

    #[test]
    fn test_case_sensitive_no_normalization() {
        let m = model(b"BT /F1 12 Tf (Hello) Tj ET");
        assert!(matches!(locate(&m, "hello"), Err(Error::TextNotFound(_))));
        assert!(matches!(locate(&m, "Hello "), Err(Error::TextNotFound(_))));
    }

    #[test]
    fn test_empty_target_not_found() {
        let m = model(b"BT /F1 12 Tf (Hello) Tj ET");
        assert!(matches!(locate(&m, ""), Err(Error::TextNotFound(_))));
    }

    #[test]
    fn test_match_across_kerning_is_allowed() {
        let m = model(b"BT /F1 12 Tf [(Hel) -50 (lo)] TJ ET");
        let span = locate(&m, "Hello").unwrap();
        assert_eq!(span, MatchSpan { start: 0, end: 5 });
    }

    #[test]
    fn test_match_across_font_change_is_refused() {
        let m = model(b"BT /F1 12 Tf (Hel) Tj /F2 12 Tf (lo) Tj ET");
        let err = locate(&m, "Hello").unwrap_err();
        assert!(matches!(err, Error::SplitFontMatch { start: 0, end: 5 }));
    }

    #[test]
    fn test_match_within_one_font_after_change_is_fine() {
        let m = model(b"BT /F1 12 Tf (Hel) Tj /F2 12 Tf (lo) Tj ET");
        let span = locate(&m, "lo").unwrap();
        assert_eq!(span, MatchSpan { start: 3, end: 5 });
    }

    #[test]
    fn test_locate_from_skips_earlier_occurrences() {
        let m = model(b"BT /F1 12 Tf (abcabc) Tj ET");
        let span = locate_from(&m, "abc", 1).unwrap();
        assert_eq!(span, MatchSpan { start: 3, end: 6 });
    }

    #[test]
    fn test_locate_from_past_end() {
        let m = model(b"BT /F1 12 Tf (abc) Tj ET");
        assert!(matches!(locate_from(&m, "abc", 3), Err(Error::TextNotFound(_))));
    }
}
