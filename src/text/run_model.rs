//! Text-run model builder.
//!
//! Walks the operator sequence in order, tracking the text state, and
//! decodes every show-text operand through the font active at that point.
//! The result is the page's logical text plus one [`CharacterSpan`] per
//! character mapping it back to (operator index, element index, byte range
//! within the operand).
//!
//! Characters are grouped into [`SpanGroup`]s: maximal runs painted with
//! one font and size and no intervening kerning adjustment or pen motion.
//! Group boundaries are what the rewriter must respect — a kerning entry or
//! a `Td` between two characters is structure that cannot be merged away —
//! and what the locator checks when deciding whether a match crosses a
//! font change.

use crate::content::graphics_state::replay;
use crate::content::operators::Operator;
use crate::error::{Error, Result};
use crate::fonts::{FontEncoding, FontTable};
use crate::object::Object;

/// Mapping from one logical character back to the bytes that paint it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterSpan {
    /// Offset of the character in the logical text (in characters)
    pub logical_offset: usize,
    /// Number of code bytes the character occupies in the operand
    pub length: usize,
    /// Index of the show-text operator that paints it
    pub operator_index: usize,
    /// For `TJ`: index of the string element within the array operand.
    /// Zero for the single-string show operators.
    pub element_index: usize,
    /// Byte range of the character's code within that string element
    pub operand_byte_range: (usize, usize),
    /// Index of the span group the character belongs to
    pub group: usize,
}

/// A maximal run of characters sharing one font/size with no structural
/// boundary (kerning entry, pen motion, state change) inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanGroup {
    /// Font resource name active for the run
    pub font_name: String,
    /// Font size active for the run
    pub font_size: f32,
}

/// The logical text of a page and its character-to-byte offset table.
///
/// Built once per edit call and discarded afterwards; the table is
/// immutable once built.
#[derive(Debug, Clone)]
pub struct TextRunModel {
    logical_text: String,
    chars: Vec<char>,
    spans: Vec<CharacterSpan>,
    groups: Vec<SpanGroup>,
}

impl TextRunModel {
    /// Build the model for an operator sequence.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownFont`] when a `Tf` names a font absent from the
    ///   page's table (surfaced, not retried)
    /// - [`Error::MalformedStream`] when a show-text operator executes with
    ///   no font selected
    pub fn build(ops: &[Operator], fonts: &FontTable) -> Result<Self> {
        let states = replay(ops);
        let mut builder = Builder::default();

        for (index, op) in ops.iter().enumerate() {
            if op.is_font_select() {
                if let Some(name) = op.operands.first().and_then(Object::as_name) {
                    if fonts.get(name).is_none() {
                        return Err(Error::UnknownFont(name.to_string()));
                    }
                }
                builder.close_group();
                continue;
            }

            if !op.is_show_text() {
                // Anything else that sits between two shows is a structural
                // boundary: motion, spacing, state, color.
                builder.close_group();
                continue;
            }

            let state = &states[index];
            let font_name = state.font_name.as_deref().ok_or_else(|| Error::MalformedStream {
                offset: op.span.as_ref().map(|r| r.start).unwrap_or(0),
                reason: "show-text operator with no font selected".to_string(),
            })?;
            let encoding = fonts
                .get(font_name)
                .ok_or_else(|| Error::UnknownFont(font_name.to_string()))?;

            if matches!(op.name.as_str(), "'" | "\"") {
                // The implicit line advance is pen motion
                builder.close_group();
            }

            if op.name == "TJ" {
                if let Some(array) = op.operands.first().and_then(Object::as_array) {
                    for (element_index, elem) in array.iter().enumerate() {
                        match elem {
                            Object::String(bytes) => builder.emit(
                                bytes,
                                index,
                                element_index,
                                encoding,
                                font_name,
                                state.font_size,
                            ),
                            elem if elem.is_number() => builder.close_group(),
                            _ => {},
                        }
                    }
                }
            } else if let Some(bytes) = op.show_string() {
                builder.emit(bytes, index, 0, encoding, font_name, state.font_size);
            }
        }

        log::debug!(
            "text-run model: {} characters in {} groups",
            builder.chars.len(),
            builder.groups.len()
        );

        Ok(Self {
            logical_text: builder.chars.iter().collect(),
            chars: builder.chars,
            spans: builder.spans,
            groups: builder.groups,
        })
    }

    /// The reconstructed logical text.
    pub fn logical_text(&self) -> &str {
        &self.logical_text
    }

    /// The logical text as characters (parallel to [`Self::spans`]).
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// One span per logical character, ordered by logical offset.
    pub fn spans(&self) -> &[CharacterSpan] {
        &self.spans
    }

    /// The span groups referenced by the spans.
    pub fn groups(&self) -> &[SpanGroup] {
        &self.groups
    }

    /// The group a span belongs to.
    pub fn group(&self, span: &CharacterSpan) -> &SpanGroup {
        &self.groups[span.group]
    }
}

#[derive(Default)]
struct Builder {
    chars: Vec<char>,
    spans: Vec<CharacterSpan>,
    groups: Vec<SpanGroup>,
    open_group: Option<usize>,
}

impl Builder {
    fn close_group(&mut self) {
        self.open_group = None;
    }

    fn emit(
        &mut self,
        bytes: &[u8],
        operator_index: usize,
        element_index: usize,
        encoding: &FontEncoding,
        font_name: &str,
        font_size: f32,
    ) {
        for decoded in encoding.decode(bytes) {
            let group = match self.open_group {
                Some(g) => g,
                None => {
                    self.groups.push(SpanGroup {
                        font_name: font_name.to_string(),
                        font_size,
                    });
                    let g = self.groups.len() - 1;
                    self.open_group = Some(g);
                    g
                },
            };
            self.spans.push(CharacterSpan {
                logical_offset: self.chars.len(),
                length: decoded.len,
                operator_index,
                element_index,
                operand_byte_range: (decoded.start, decoded.start + decoded.len),
                group,
            });
            self.chars.push(decoded.ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tokenize;
    use crate::fonts::FontEncoding;

    fn fonts() -> FontTable {
        let mut table = FontTable::new();
        table.insert("F1", FontEncoding::winansi("Helvetica"));
        table.insert("F2", FontEncoding::winansi("Times-Roman"));
        table
    }

    fn model(src: &[u8]) -> TextRunModel {
        let ops = tokenize(src).unwrap();
        TextRunModel::build(&ops, &fonts()).unwrap()
    }

    #[test]
    fn test_simple_tj() {
        let m = model(b"BT /F1 12 Tf (Hello World) Tj ET");
        assert_eq!(m.logical_text(), "Hello World");
        assert_eq!(m.spans().len(), 11);
        assert_eq!(m.groups().len(), 1);

        let span = &m.spans()[6]; // 'W'
        assert_eq!(span.operator_index, 2);
        assert_eq!(span.operand_byte_range, (6, 7));
    }

    #[test]
    fn test_tj_array_with_kerning() {
        let m = model(b"BT /F1 12 Tf [(Hel) -50 (lo)] TJ ET");
        assert_eq!(m.logical_text(), "Hello");
        // The kerning entry splits one font run into two groups
        assert_eq!(m.groups().len(), 2);
        assert_eq!(m.spans()[2].group, 0);
        assert_eq!(m.spans()[3].group, 1);
        assert_eq!(m.spans()[3].element_index, 2);
        assert_eq!(m.spans()[3].operand_byte_range, (0, 1));
    }

    #[test]
    fn test_text_across_operators_same_group() {
        // Adjacent shows with nothing between them merge into one group
        let m = model(b"BT /F1 12 Tf (Hel) Tj (lo) Tj ET");
        assert_eq!(m.logical_text(), "Hello");
        assert_eq!(m.groups().len(), 1);
    }

    #[test]
    fn test_motion_operator_closes_group() {
        let m = model(b"BT /F1 12 Tf (Hel) Tj 5 0 Td (lo) Tj ET");
        assert_eq!(m.logical_text(), "Hello");
        assert_eq!(m.groups().len(), 2);
    }

    #[test]
    fn test_font_change_closes_group() {
        let m = model(b"BT /F1 12 Tf (ab) Tj /F2 12 Tf (cd) Tj ET");
        assert_eq!(m.logical_text(), "abcd");
        assert_eq!(m.groups().len(), 2);
        assert_eq!(m.group(&m.spans()[0]).font_name, "F1");
        assert_eq!(m.group(&m.spans()[2]).font_name, "F2");
    }

    #[test]
    fn test_size_change_closes_group() {
        let m = model(b"BT /F1 12 Tf (ab) Tj /F1 9 Tf (cd) Tj ET");
        assert_eq!(m.groups().len(), 2);
        assert_eq!(m.group(&m.spans()[0]).font_size, 12.0);
        assert_eq!(m.group(&m.spans()[2]).font_size, 9.0);
    }

    #[test]
    fn test_quote_operators_contribute_text() {
        let m = model(b"BT /F1 10 Tf 12 TL (one) Tj (two) ' ET");
        assert_eq!(m.logical_text(), "onetwo");
        // ' moves the pen, so its text starts a new group
        assert_eq!(m.groups().len(), 2);
    }

    #[test]
    fn test_unknown_font_at_tf() {
        let ops = tokenize(b"BT /F9 12 Tf (x) Tj ET").unwrap();
        let err = TextRunModel::build(&ops, &fonts()).unwrap_err();
        match err {
            Error::UnknownFont(name) => assert_eq!(name, "F9"),
            other => panic!("expected UnknownFont, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_font_surfaces_even_without_show() {
        let ops = tokenize(b"BT /F9 12 Tf ET").unwrap();
        assert!(matches!(
            TextRunModel::build(&ops, &fonts()),
            Err(Error::UnknownFont(_))
        ));
    }

    #[test]
    fn test_show_without_font_is_malformed() {
        let ops = tokenize(b"BT (orphan) Tj ET").unwrap();
        assert!(matches!(
            TextRunModel::build(&ops, &fonts()),
            Err(Error::MalformedStream { .. })
        ));
    }

    #[test]
    fn test_font_restored_by_q() {
        let m = model(b"/F1 10 Tf q /F2 20 Tf (a) Tj Q (b) Tj");
        assert_eq!(m.group(&m.spans()[0]).font_name, "F2");
        assert_eq!(m.group(&m.spans()[1]).font_name, "F1");
    }

    #[test]
    fn test_empty_stream_empty_model() {
        let m = model(b"");
        assert_eq!(m.logical_text(), "");
        assert!(m.spans().is_empty());
        assert!(m.groups().is_empty());
    }
}
