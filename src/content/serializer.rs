//! Content-stream re-serialization.
//!
//! The exact inverse of [`crate::content::parser::tokenize`]: operators
//! that still carry their source span are emitted as the original bytes
//! verbatim — including the whitespace and comments that preceded them — so
//! a stream passed through untouched round-trips byte-identically.
//! Synthesized operators (the product of a rewrite) are emitted
//! canonically: operands space-separated before the name, literal strings
//! escaped, and hex-string form used when operand bytes fall outside the
//! printable range.

use crate::content::operators::Operator;
use crate::lexer::{is_pdf_delimiter, is_pdf_whitespace};
use crate::object::Object;

/// Serialize an operator sequence back to bytes.
///
/// `source` is the stream the span-carrying operators were parsed from;
/// `tail` is the offset of the trailing whitespace after the final parsed
/// operator. Returns the bytes and their length (for the caller to update
/// the stream object's length entry).
pub fn serialize(source: &[u8], ops: &[Operator], tail: usize) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(source.len());

    for op in ops {
        match &op.span {
            Some(range) => out.extend_from_slice(&source[range.clone()]),
            None => {
                if let Some(&last) = out.last() {
                    if !is_pdf_whitespace(last) {
                        out.push(b'\n');
                    }
                }
                write_operator(&mut out, op);
            },
        }
    }

    if tail < source.len() {
        out.extend_from_slice(&source[tail..]);
    }

    let len = out.len();
    (out, len)
}

/// Emit one synthesized operator: operands, each followed by a space, then
/// the operator name.
fn write_operator(out: &mut Vec<u8>, op: &Operator) {
    for operand in &op.operands {
        write_object(out, operand);
        out.push(b' ');
    }
    out.extend_from_slice(op.name.as_bytes());
}

/// Emit one operand in canonical form.
fn write_object(out: &mut Vec<u8>, obj: &Object) {
    match obj {
        Object::Null => out.extend_from_slice(b"null"),
        Object::Boolean(true) => out.extend_from_slice(b"true"),
        Object::Boolean(false) => out.extend_from_slice(b"false"),
        Object::Integer(i) => out.extend_from_slice(i.to_string().as_bytes()),
        Object::Real(r) => out.extend_from_slice(r.to_string().as_bytes()),
        Object::String(bytes) => write_string(out, bytes),
        Object::Name(name) => write_name(out, name),
        Object::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_object(out, item);
            }
            out.push(b']');
        },
        Object::Dictionary(dict) => {
            // Sorted keys keep synthesized dictionaries deterministic
            let mut keys: Vec<&String> = dict.keys().collect();
            keys.sort();
            out.extend_from_slice(b"<<");
            for key in keys {
                out.push(b' ');
                write_name(out, key);
                out.push(b' ');
                if let Some(value) = dict.get(key) {
                    write_object(out, value);
                }
            }
            out.extend_from_slice(b" >>");
        },
        Object::Reference(r) => {
            out.extend_from_slice(format!("{} {} R", r.id, r.gen).as_bytes())
        },
    }
}

/// Emit a string operand: escaped literal form when every byte is
/// printable, hex form otherwise.
fn write_string(out: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.iter().all(|b| (0x20..0x7F).contains(b)) {
        out.push(b'(');
        for &b in bytes {
            match b {
                b'(' => out.extend_from_slice(b"\\("),
                b')' => out.extend_from_slice(b"\\)"),
                b'\\' => out.extend_from_slice(b"\\\\"),
                _ => out.push(b),
            }
        }
        out.push(b')');
    } else {
        out.push(b'<');
        for b in bytes {
            out.extend_from_slice(format!("{:02X}", b).as_bytes());
        }
        out.push(b'>');
    }
}

/// Emit a name operand, `#XX`-escaping bytes a bare name cannot carry.
fn write_name(out: &mut Vec<u8>, name: &str) {
    out.push(b'/');
    for &b in name.as_bytes() {
        if is_pdf_whitespace(b) || is_pdf_delimiter(b) || b == b'#' || !(0x21..0x7F).contains(&b) {
            out.extend_from_slice(format!("#{:02X}", b).as_bytes());
        } else {
            out.push(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tokenize;

    fn roundtrip(src: &[u8]) -> Vec<u8> {
        let ops = tokenize(src).unwrap();
        let tail = ops.iter().filter_map(|op| op.span.as_ref()).map(|r| r.end).max().unwrap_or(0);
        serialize(src, &ops, tail).0
    }

    #[test]
    fn test_verbatim_roundtrip() {
        let src: &[u8] = b"BT\n  /F1 12 Tf\n  100 700 Td\n  (Hello, World!) Tj\nET\n";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn test_verbatim_roundtrip_preserves_comments_and_oddities() {
        let src: &[u8] =
            b"% page 1\nBT /F1 9.50 Tf % tiny\n[(a\\(b) -12.0 <4869>] TJ\nET \t\r\n";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn test_synthesized_tj() {
        let op = Operator::new("Tj", vec![Object::String(b"Hello".to_vec())]);
        let (out, len) = serialize(b"", &[op], 0);
        assert_eq!(out, b"(Hello) Tj");
        assert_eq!(len, 10);
    }

    #[test]
    fn test_synthesized_tj_array() {
        let op = Operator::new(
            "TJ",
            vec![Object::Array(vec![
                Object::String(b"Hel".to_vec()),
                Object::Integer(-50),
                Object::String(b"lo".to_vec()),
            ])],
        );
        let (out, _) = serialize(b"", &[op], 0);
        assert_eq!(out, b"[(Hel) -50 (lo)] TJ");
    }

    #[test]
    fn test_string_escaping() {
        let op = Operator::new("Tj", vec![Object::String(b"a(b)c\\d".to_vec())]);
        let (out, _) = serialize(b"", &[op], 0);
        assert_eq!(out, br"(a\(b\)c\\d) Tj");
    }

    #[test]
    fn test_nonprintable_bytes_use_hex_form() {
        let op = Operator::new("Tj", vec![Object::String(vec![0x48, 0x69, 0xE9])]);
        let (out, _) = serialize(b"", &[op], 0);
        assert_eq!(out, b"<4869E9> Tj");
    }

    #[test]
    fn test_synthesized_between_raw_operators() {
        let src: &[u8] = b"BT (old) Tj ET";
        let mut ops = tokenize(src).unwrap();
        // Replace the Tj but keep BT/ET verbatim
        ops[1] = Operator::new("Tj", vec![Object::String(b"new".to_vec())]);
        let (out, _) = serialize(src, &ops, src.len());
        assert_eq!(out, b"BT\n(new) Tj ET");
    }

    #[test]
    fn test_real_formatting() {
        let op = Operator::new("Td", vec![Object::Real(1.5), Object::Real(-2.0)]);
        let (out, _) = serialize(b"", &[op], 0);
        assert_eq!(out, b"1.5 -2 Td");
    }

    #[test]
    fn test_name_escaping() {
        let mut out = Vec::new();
        write_name(&mut out, "A B#C");
        assert_eq!(out, b"/A#20B#23C");
    }
}
