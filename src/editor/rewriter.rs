//! Run rewriter.
//!
//! Replaces the matched character range with replacement text re-encoded
//! through the font active at the match start. Operators strictly outside
//! the covered range are copied unchanged (they keep their source spans and
//! re-serialize byte-identically). Inside the range:
//!
//! - the matched bytes of the first covered show operator are replaced by a
//!   single new string operand, with any unmatched prefix kept as its own
//!   segment;
//! - show operators fully covered by the match lose their text (a `'` or
//!   `"` keeps its line-advance/spacing effects as explicit operators);
//! - the last covered operator keeps its unmatched suffix;
//! - kerning entries strictly outside the matched sub-range survive;
//!   entries that fell inside are dropped — their displacement values were
//!   computed for glyphs that no longer exist, and carrying them over would
//!   misplace the new text. This is a deliberate simplification, not
//!   width-aware reflow.
//!
//! Non-show operators between covered shows (positioning, color) are kept.

use crate::content::operators::Operator;
use crate::error::{Error, Result};
use crate::fonts::FontTable;
use crate::object::Object;
use crate::search::MatchSpan;
use crate::text::{CharacterSpan, TextRunModel};

/// Rewrite the operator sequence so the matched span shows `replacement`.
///
/// `span` must be a non-empty match over `model`, as produced by
/// [`locate`](crate::search::locate) against the same operator sequence.
///
/// # Errors
///
/// - [`Error::UnencodableCharacter`] when `replacement` contains a
///   character absent from the active font's encoding (no substitution is
///   attempted)
/// - [`Error::UnknownFont`] when the match's font is missing from the
///   table (an inconsistent model; cannot happen for models built against
///   the same table)
pub fn rewrite(
    ops: &[Operator],
    model: &TextRunModel,
    span: &MatchSpan,
    replacement: &str,
    fonts: &FontTable,
) -> Result<Vec<Operator>> {
    let covered = &model.spans()[span.start..span.end];
    let first = covered[0];
    let last = covered[covered.len() - 1];

    let group = model.group(&first);
    let encoding = fonts
        .get(&group.font_name)
        .ok_or_else(|| Error::UnknownFont(group.font_name.clone()))?;
    let new_bytes = encoding.encode(replacement).map_err(|ch| Error::UnencodableCharacter {
        ch,
        font: encoding.name().to_string(),
    })?;

    let op_lo = first.operator_index;
    let op_hi = last.operator_index;
    log::debug!(
        "rewriting operators {}..={} (chars {}..{})",
        op_lo,
        op_hi,
        span.start,
        span.end
    );

    let mut out: Vec<Operator> = ops[..op_lo].to_vec();

    // First covered operator: unmatched prefix, then the replacement.
    let mut segments = prefix_segments(&ops[op_lo], &first);
    if !new_bytes.is_empty() {
        segments.push(Object::String(new_bytes));
    }
    if op_lo == op_hi {
        segments.extend(suffix_segments(&ops[op_hi], &last));
    }
    emit_show(&mut out, &ops[op_lo], segments);

    if op_lo != op_hi {
        for op in &ops[op_lo + 1..op_hi] {
            if op.is_show_text() {
                // Fully covered: the text goes away, the side effects stay.
                emit_show(&mut out, op, Vec::new());
            } else {
                out.push(op.clone());
            }
        }
        emit_show(&mut out, &ops[op_hi], suffix_segments(&ops[op_hi], &last));
    }

    out.extend_from_slice(&ops[op_hi + 1..]);
    Ok(out)
}

/// The segments of `op` strictly before the first matched character:
/// complete elements before the match element (kerning entries included),
/// plus the unmatched head of the match element itself.
fn prefix_segments(op: &Operator, first: &CharacterSpan) -> Vec<Object> {
    let mut segments = Vec::new();
    let cut = first.operand_byte_range.0;

    if op.name == "TJ" {
        if let Some(array) = op.operands.first().and_then(Object::as_array) {
            segments.extend(array[..first.element_index].iter().cloned());
            if let Some(bytes) = array.get(first.element_index).and_then(Object::as_string) {
                if cut > 0 {
                    segments.push(Object::String(bytes[..cut].to_vec()));
                }
            }
        }
    } else if let Some(bytes) = op.show_string() {
        if cut > 0 {
            segments.push(Object::String(bytes[..cut].to_vec()));
        }
    }

    segments
}

/// The segments of `op` strictly after the last matched character: the
/// unmatched tail of the match element, plus complete elements after it.
fn suffix_segments(op: &Operator, last: &CharacterSpan) -> Vec<Object> {
    let mut segments = Vec::new();
    let cut = last.operand_byte_range.1;

    if op.name == "TJ" {
        if let Some(array) = op.operands.first().and_then(Object::as_array) {
            if let Some(bytes) = array.get(last.element_index).and_then(Object::as_string) {
                if cut < bytes.len() {
                    segments.push(Object::String(bytes[cut..].to_vec()));
                }
            }
            segments.extend(array[last.element_index + 1..].iter().cloned());
        }
    } else if let Some(bytes) = op.show_string() {
        if cut < bytes.len() {
            segments.push(Object::String(bytes[cut..].to_vec()));
        }
    }

    segments
}

/// Emit a rewritten show operator carrying `segments`.
///
/// Keeps the original operator name when the payload is still a single
/// string; falls back to the `TJ` array form when the operand had to be
/// split. `'` and `"` never lose their line-advance and spacing effects:
/// with a split or empty payload those are re-emitted as explicit `T*`
/// (and `Tw`/`Tc`) operators.
fn emit_show(out: &mut Vec<Operator>, original: &Operator, segments: Vec<Object>) {
    let single_string = segments.len() == 1 && matches!(segments[0], Object::String(_));

    match original.name.as_str() {
        "Tj" => {
            if single_string {
                out.push(Operator::new("Tj", segments));
            } else if !segments.is_empty() {
                out.push(Operator::new("TJ", vec![Object::Array(segments)]));
            }
        },
        "TJ" => {
            if !segments.is_empty() {
                out.push(Operator::new("TJ", vec![Object::Array(segments)]));
            }
        },
        "'" => {
            if single_string {
                out.push(Operator::new("'", segments));
            } else {
                out.push(Operator::new("T*", Vec::new()));
                if !segments.is_empty() {
                    out.push(Operator::new("TJ", vec![Object::Array(segments)]));
                }
            }
        },
        "\"" => {
            let aw = original.operands.first().cloned().unwrap_or(Object::Integer(0));
            let ac = original.operands.get(1).cloned().unwrap_or(Object::Integer(0));
            if single_string {
                let mut operands = vec![aw, ac];
                operands.extend(segments);
                out.push(Operator::new("\"", operands));
            } else {
                out.push(Operator::new("Tw", vec![aw]));
                out.push(Operator::new("Tc", vec![ac]));
                out.push(Operator::new("T*", Vec::new()));
                if !segments.is_empty() {
                    out.push(Operator::new("TJ", vec![Object::Array(segments)]));
                }
            }
        },
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tokenize;
    use crate::fonts::FontEncoding;
    use crate::search::locate;
    use crate::text::TextRunModel;

    fn fonts() -> FontTable {
        let mut table = FontTable::new();
        table.insert("F1", FontEncoding::winansi("Helvetica"));
        table
    }

    fn apply(src: &[u8], old: &str, new: &str) -> Vec<Operator> {
        let table = fonts();
        let ops = tokenize(src).unwrap();
        let model = TextRunModel::build(&ops, &table).unwrap();
        let span = locate(&model, old).unwrap();
        rewrite(&ops, &model, &span, new, &table).unwrap()
    }

    fn logical_text(ops: &[Operator]) -> String {
        TextRunModel::build(ops, &fonts()).unwrap().logical_text().to_string()
    }

    #[test]
    fn test_replace_within_single_tj() {
        let ops = apply(b"BT /F1 12 Tf (Hello World) Tj ET", "World", "Earth");
        assert_eq!(logical_text(&ops), "Hello Earth");
        // Prefix split forces array form; "Hello " keeps its own segment
        let tj = &ops[2];
        assert_eq!(tj.name, "TJ");
        let array = tj.operands[0].as_array().unwrap();
        assert_eq!(array[0], Object::String(b"Hello ".to_vec()));
        assert_eq!(array[1], Object::String(b"Earth".to_vec()));
    }

    #[test]
    fn test_whole_operand_keeps_operator_name() {
        let ops = apply(b"BT /F1 12 Tf (Hello) Tj ET", "Hello", "Howdy");
        assert_eq!(ops[2].name, "Tj");
        assert_eq!(ops[2].operands[0], Object::String(b"Howdy".to_vec()));
    }

    #[test]
    fn test_kerned_match_collapses_to_single_segment() {
        let ops = apply(b"BT /F1 12 Tf [(Hel) -50 (lo)] TJ ET", "Hello", "Howdy");
        let array = ops[2].operands[0].as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0], Object::String(b"Howdy".to_vec()));
    }

    #[test]
    fn test_kerning_outside_match_is_preserved() {
        let ops = apply(b"BT /F1 12 Tf [(AB) -30 (CD) -40 (EF)] TJ ET", "CD", "XY");
        let array = ops[2].operands[0].as_array().unwrap();
        assert_eq!(
            array,
            &vec![
                Object::String(b"AB".to_vec()),
                Object::Integer(-30),
                Object::String(b"XY".to_vec()),
                Object::Integer(-40),
                Object::String(b"EF".to_vec()),
            ]
        );
    }

    #[test]
    fn test_kerning_inside_match_is_dropped() {
        let ops = apply(b"BT /F1 12 Tf [(AB) -30 (CD)] TJ ET", "BC", "xx");
        let array = ops[2].operands[0].as_array().unwrap();
        assert_eq!(
            array,
            &vec![
                Object::String(b"A".to_vec()),
                Object::String(b"xx".to_vec()),
                Object::String(b"D".to_vec()),
            ]
        );
    }

    #[test]
    fn test_match_across_adjacent_operators() {
        let ops = apply(b"BT /F1 12 Tf (Hel) Tj (lo there) Tj ET", "Hello", "Goodbye");
        assert_eq!(logical_text(&ops), "Goodbye there");
        // Replacement collapses into the first operator, suffix stays in
        // the second
        assert_eq!(ops[2].operands[0], Object::String(b"Goodbye".to_vec()));
        assert_eq!(ops[3].operands[0], Object::String(b" there".to_vec()));
    }

    #[test]
    fn test_operators_outside_match_are_untouched() {
        let src: &[u8] = b"BT /F1 12 Tf 0 0 1 rg (Hello World) Tj 1 0 0 rg (rest) Tj ET";
        let original = tokenize(src).unwrap();
        let ops = apply(src, "World", "Earth");
        assert_eq!(ops[0], original[0]);
        assert_eq!(ops[1], original[1]);
        assert_eq!(ops[2], original[2]);
        // The rg after the edited Tj and everything later survive verbatim
        assert_eq!(ops[4..], original[4..]);
    }

    #[test]
    fn test_intermediate_non_show_operator_is_kept() {
        let src: &[u8] = b"BT /F1 12 Tf (He) Tj 1 0 0 rg (llo) Tj ET";
        let ops = apply(src, "Hello", "Bye");
        let names: Vec<&str> = ops.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "Tj", "rg", "ET"]);
        assert_eq!(logical_text(&ops), "Bye");
    }

    #[test]
    fn test_quote_full_replacement_keeps_quote() {
        let ops = apply(b"BT /F1 12 Tf 14 TL (intro) Tj (line) ' ET", "line", "next");
        let quote = ops.iter().find(|op| op.name == "'").unwrap();
        assert_eq!(quote.operands[0], Object::String(b"next".to_vec()));
    }

    #[test]
    fn test_quote_split_becomes_t_star_and_tj() {
        let ops = apply(b"BT /F1 12 Tf 14 TL (intro) Tj (one two) ' ET", "two", "2");
        let names: Vec<&str> = ops.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "TL", "Tj", "T*", "TJ", "ET"]);
        assert_eq!(logical_text(&ops), "introone 2");
    }

    #[test]
    fn test_double_quote_split_preserves_spacing() {
        let ops = apply(b"BT /F1 12 Tf 14 TL (a) Tj 2 1 (one two) \" ET", "two", "2");
        let names: Vec<&str> = ops.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "TL", "Tj", "Tw", "Tc", "T*", "TJ", "ET"]);
        assert_eq!(ops[4].operands[0], Object::Integer(2));
        assert_eq!(ops[5].operands[0], Object::Integer(1));
    }

    #[test]
    fn test_deletion_with_empty_replacement() {
        let ops = apply(b"BT /F1 12 Tf (Hello World) Tj ET", " World", "");
        assert_eq!(logical_text(&ops), "Hello");
        assert_eq!(ops[2].name, "Tj");
        assert_eq!(ops[2].operands[0], Object::String(b"Hello".to_vec()));
    }

    #[test]
    fn test_deletion_of_whole_operand_drops_operator() {
        let ops = apply(b"BT /F1 12 Tf (gone) Tj (kept) Tj ET", "gone", "");
        assert_eq!(logical_text(&ops), "kept");
        let names: Vec<&str> = ops.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "Tj", "ET"]);
    }

    #[test]
    fn test_unencodable_replacement_character() {
        let table = fonts();
        let ops = tokenize(b"BT /F1 12 Tf (Hello) Tj ET").unwrap();
        let model = TextRunModel::build(&ops, &table).unwrap();
        let span = locate(&model, "Hello").unwrap();
        let err = rewrite(&ops, &model, &span, "你好", &table).unwrap_err();
        match err {
            Error::UnencodableCharacter { ch, font } => {
                assert_eq!(ch, '你');
                assert_eq!(font, "Helvetica");
            },
            other => panic!("expected UnencodableCharacter, got {other:?}"),
        }
    }

    #[test]
    fn test_winansi_replacement_reencodes() {
        // The replacement contains a WinAnsi-special character; it must be
        // re-encoded through the font's table, not copied as UTF-8
        let ops = apply(b"BT /F1 12 Tf (dash) Tj ET", "dash", "a\u{2014}b");
        assert_eq!(ops[2].operands[0], Object::String(vec![b'a', 0x97, b'b']));
    }
}
