//! Content-stream parser.
//!
//! Assembles lexer tokens into [`Operator`] values. Content streams use
//! postfix notation: operands come first, then the operator name. Example:
//!
//! ```text
//! BT
//!   /F1 12 Tf
//!   100 700 Td
//!   (Hello, World!) Tj
//! ET
//! ```
//!
//! Each parsed operator records the byte span from the end of the previous
//! operator through its own keyword, so the concatenation of all spans plus
//! the stream's trailing whitespace reproduces the input exactly. The
//! serializer depends on this for byte-identical round trips.
//!
//! Parsing is strict: bytes the grammar cannot classify, unterminated
//! strings/arrays/dictionaries, and operand shapes that do not match the
//! following operator name all fail with
//! [`Error::MalformedStream`](crate::Error::MalformedStream). A rewriter
//! must not guess its way past bytes it will later re-emit.

use crate::content::operators::{Operator, validate_operands};
use crate::error::{Error, Result};
use crate::lexer::{Token, skip_ws, token};
use crate::object::{Object, ObjectRef};
use nom::IResult;
use std::collections::HashMap;

/// Decode escape sequences in PDF literal strings.
///
/// Per ISO 32000-1:2008, Section 7.3.4.2:
///
/// - `\n` `\r` `\t` `\b` `\f` → the usual control bytes
/// - `\(` `\)` `\\` → the literal character
/// - `\ddd` → byte with octal code (1-3 digits)
/// - `\<newline>` → line continuation (removed)
/// - any other `\x` → `x` kept with its backslash (spec-tolerated)
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'\\' && i + 1 < raw.len() {
            match raw[i + 1] {
                b'n' => {
                    result.push(b'\n');
                    i += 2;
                },
                b'r' => {
                    result.push(b'\r');
                    i += 2;
                },
                b't' => {
                    result.push(b'\t');
                    i += 2;
                },
                b'b' => {
                    result.push(8);
                    i += 2;
                },
                b'f' => {
                    result.push(12);
                    i += 2;
                },
                b'(' => {
                    result.push(b'(');
                    i += 2;
                },
                b')' => {
                    result.push(b')');
                    i += 2;
                },
                b'\\' => {
                    result.push(b'\\');
                    i += 2;
                },
                b'\n' => {
                    i += 2;
                },
                b'\r' => {
                    i += 2;
                    if i < raw.len() && raw[i] == b'\n' {
                        i += 1;
                    }
                },
                c if (b'0'..b'8').contains(&c) => {
                    let start = i + 1;
                    let mut octal_value = 0u32;
                    let mut octal_len = 0;

                    for j in 0..3 {
                        if start + j < raw.len() {
                            let digit = raw[start + j];
                            if (b'0'..b'8').contains(&digit) {
                                octal_value = octal_value * 8 + (digit - b'0') as u32;
                                octal_len += 1;
                            } else {
                                break;
                            }
                        } else {
                            break;
                        }
                    }

                    result.push((octal_value & 0xFF) as u8);
                    i += 1 + octal_len;
                },
                _ => {
                    result.push(b'\\');
                    i += 1;
                },
            }
        } else {
            result.push(raw[i]);
            i += 1;
        }
    }

    result
}

/// Decode the digits of a hex string to bytes.
///
/// Whitespace between digits is ignored; an odd final digit is padded with
/// zero, per ISO 32000-1:2008, Section 7.3.4.3.
fn decode_hex(hex: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = hex.iter().copied().filter(|b| b.is_ascii_hexdigit()).collect();
    let mut result = Vec::with_capacity(digits.len().div_ceil(2));

    for pair in digits.chunks(2) {
        let hi = (pair[0] as char).to_digit(16).unwrap_or(0) as u8;
        let lo = if pair.len() == 2 {
            (pair[1] as char).to_digit(16).unwrap_or(0) as u8
        } else {
            0
        };
        result.push((hi << 4) | lo);
    }

    result
}

/// Parse one operand object from input bytes.
///
/// Handles primitives (null, booleans, numbers, strings, names), composite
/// arrays and dictionaries, and indirect references (`10 0 R`). Unlike the
/// document-level grammar, arrays and dictionaries here must be closed
/// before end of input.
fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (input, tok) = token(input)?;

    match tok {
        Token::Null => Ok((input, Object::Null)),
        Token::True => Ok((input, Object::Boolean(true))),
        Token::False => Ok((input, Object::Boolean(false))),

        Token::Integer(i) => {
            // Could be a plain integer or the start of a reference
            // (obj_num gen R); look ahead for the two follow-up tokens.
            if i >= 0 {
                if let Ok((input2, Token::Integer(gen))) = token(input) {
                    if (0..=u16::MAX as i64).contains(&gen) {
                        if let Ok((input3, Token::Keyword("R"))) = token(input2) {
                            return Ok((
                                input3,
                                Object::Reference(ObjectRef::new(i as u32, gen as u16)),
                            ));
                        }
                    }
                }
            }

            Ok((input, Object::Integer(i)))
        },

        Token::Real(r) => Ok((input, Object::Real(r))),

        Token::LiteralString(bytes) => {
            Ok((input, Object::String(decode_literal_string_escapes(bytes))))
        },

        Token::HexString(hex) => Ok((input, Object::String(decode_hex(hex)))),

        Token::Name(name) => Ok((input, Object::Name(name))),

        Token::ArrayStart => parse_array(input),
        Token::DictStart => parse_dictionary(input),

        // ], >>, or a keyword in operand position
        _ => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))),
    }
}

/// Parse array contents after `[`. The closing `]` is required.
fn parse_array(input: &[u8]) -> IResult<&[u8], Object> {
    let mut objects = Vec::new();
    let mut remaining = input;

    loop {
        match token(remaining) {
            Ok((inp, Token::ArrayEnd)) => {
                return Ok((inp, Object::Array(objects)));
            },
            Ok(_) => {
                let (inp, obj) = parse_object(remaining)?;
                objects.push(obj);
                remaining = inp;
            },
            Err(e) => {
                // Unterminated array at end of input is an error, not a
                // partial result
                return Err(e);
            },
        }
    }
}

/// Parse dictionary contents after `<<`. Keys must be names; the closing
/// `>>` is required.
fn parse_dictionary(input: &[u8]) -> IResult<&[u8], Object> {
    let mut dict = HashMap::new();
    let mut remaining = input;

    loop {
        match token(remaining) {
            Ok((inp, Token::DictEnd)) => {
                return Ok((inp, Object::Dictionary(dict)));
            },
            Ok((inp, Token::Name(key))) => {
                let (inp, value) = parse_object(inp)?;
                dict.insert(key, value);
                remaining = inp;
            },
            Ok(_) => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    remaining,
                    nom::error::ErrorKind::Tag,
                )));
            },
            Err(e) => return Err(e),
        }
    }
}

fn offset_of(data: &[u8], rest: &[u8]) -> usize {
    data.len() - rest.len()
}

/// Parse a content stream into its operator sequence.
///
/// # Arguments
///
/// * `data` - Raw content-stream bytes, already decompressed
///
/// # Errors
///
/// [`Error::MalformedStream`] when a token cannot be classified, a string/
/// array/dictionary is unterminated, operands are left dangling at end of
/// stream, or an operator's operand shape violates the grammar.
pub fn tokenize(data: &[u8]) -> Result<Vec<Operator>> {
    let mut ops: Vec<Operator> = Vec::new();
    let mut operands: Vec<Object> = Vec::new();
    let mut rest: &[u8] = data;
    let mut span_start = 0usize;

    loop {
        match token(rest) {
            Ok((next, Token::Keyword(name))) if name != "R" => {
                let end = offset_of(data, next);
                validate_operands(name, &operands)
                    .map_err(|reason| Error::MalformedStream { offset: end, reason })?;
                ops.push(Operator {
                    name: name.to_string(),
                    operands: std::mem::take(&mut operands),
                    span: Some(span_start..end),
                });
                span_start = end;
                rest = next;
            },
            Ok(_) => {
                // Operand position: re-parse from the token start so
                // composite objects and references assemble correctly.
                let at = offset_of(data, rest);
                let (next, obj) = parse_object(rest).map_err(|_| Error::MalformedStream {
                    offset: at,
                    reason: "malformed operand".to_string(),
                })?;
                operands.push(obj);
                rest = next;
            },
            Err(_) => {
                // Either clean end of stream or unclassifiable bytes.
                let (after_ws, _) = skip_ws(rest).unwrap_or((rest, ()));
                if after_ws.is_empty() {
                    if !operands.is_empty() {
                        return Err(Error::MalformedStream {
                            offset: data.len(),
                            reason: format!(
                                "{} operand(s) with no operator at end of stream",
                                operands.len()
                            ),
                        });
                    }
                    break;
                }
                return Err(Error::MalformedStream {
                    offset: offset_of(data, after_ws),
                    reason: "unclassifiable or unterminated token".to_string(),
                });
            },
        }
    }

    log::debug!("parsed {} operators from {} bytes", ops.len(), data.len());
    Ok(ops)
}
