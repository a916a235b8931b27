//! Content-stream lexer (tokenizer).
//!
//! Low-level tokenization of PDF content-stream bytes. Content streams use
//! the general PDF token grammar:
//!
//! - Numbers: integers (42, -123) and reals (3.14, -2.5, .5)
//! - Strings: literal ((Hello)) and hexadecimal (<48656C6C6F>)
//! - Names: identifiers starting with / (/F1, /GS0)
//! - Keywords: operator names (Tj, TJ, q, cm, ...) plus true/false/null
//! - Delimiters: `[`, `]`, `<<`, `>>`
//!
//! Whitespace (space, \t, \r, \n, \0, \f) and comments (% to EOL) are
//! skipped before each token. Escape sequences inside literal strings are
//! NOT decoded here; the parser does that, so the lexer can report the raw
//! extent of every token.
//!
//! The lexer is strict: bytes that cannot be classified produce an error
//! instead of being skipped. An editor that drops bytes it does not
//! understand would corrupt the stream it later rewrites.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, opt, value},
    sequence::{delimited, preceded},
};

/// Token types recognized by the content-stream lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Integer number (e.g., 42, -123)
    Integer(i64),

    /// Real (floating-point) number (e.g., 3.14, -2.5, .5)
    Real(f64),

    /// Literal string bytes (content of "(Hello)")
    /// Escape sequences are NOT decoded at lexer level.
    LiteralString(&'a [u8]),

    /// Hexadecimal string bytes (content of "<48656C6C6F>")
    /// Whitespace is preserved; decoding happens at parser level.
    HexString(&'a [u8]),

    /// Name (e.g., "F1" from "/F1")
    /// `#XX` escape sequences ARE decoded at lexer level per PDF spec.
    Name(String),

    /// Boolean true keyword
    True,

    /// Boolean false keyword
    False,

    /// Null keyword
    Null,

    /// Array start delimiter [
    ArrayStart,

    /// Array end delimiter ]
    ArrayEnd,

    /// Dictionary start delimiter <<
    DictStart,

    /// Dictionary end delimiter >>
    DictEnd,

    /// Bare keyword: an operator name (Tj, TJ, T*, ', ", ...) or "R"
    Keyword(&'a str),
}

/// Check if a byte is PDF whitespace (PDF Ref 1.7, Table 3.1).
pub fn is_pdf_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

/// Check if a byte is PDF whitespace or a delimiter character.
pub fn is_pdf_delimiter(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Parse whitespace characters. Requires at least one.
fn whitespace(input: &[u8]) -> IResult<&[u8], ()> {
    let (remaining, ws) = take_while(is_pdf_whitespace)(input)?;

    if ws.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Space)));
    }

    Ok((remaining, ()))
}

/// Parse a comment (% to end of line).
fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

/// Skip all whitespace and comments.
///
/// Never fails; consumes zero or more bytes.
pub fn skip_ws(input: &[u8]) -> IResult<&[u8], ()> {
    let mut remaining = input;

    loop {
        let before = remaining;

        if let Ok((rest, _)) = whitespace(remaining) {
            remaining = rest;
            continue;
        }

        if let Ok((rest, _)) = comment(remaining) {
            remaining = rest;
            continue;
        }

        if remaining == before {
            break;
        }
    }

    Ok((remaining, ()))
}

/// Parse an integer or real number.
///
/// PDF numbers allow leading +/- signs and may start or end with the
/// decimal point: 42, -123, +17, 3.14, .5, 5.
fn parse_number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (rest, sign) = opt(one_of("+-"))(input)?;
    let (rest, int_part) = opt(digit1)(rest)?;
    let (rest, frac_part) = opt(preceded(char('.'), opt(digit1)))(rest)?;

    // Require at least one digit somewhere ("." or "-" alone is not a number)
    let has_frac_digits = matches!(frac_part, Some(Some(_)));
    if int_part.is_none() && !has_frac_digits {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)));
    }

    if frac_part.is_some() {
        let mut num_str = String::new();
        if sign == Some('-') {
            num_str.push('-');
        }
        match int_part {
            Some(int) => num_str.push_str(std::str::from_utf8(int).map_err(|_| {
                nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
            })?),
            None => num_str.push('0'),
        }
        num_str.push('.');
        if let Some(Some(frac)) = frac_part {
            num_str.push_str(std::str::from_utf8(frac).map_err(|_| {
                nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
            })?);
        } else {
            num_str.push('0');
        }

        let num: f64 = num_str.parse().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?;
        Ok((rest, Token::Real(num)))
    } else {
        let int_bytes = int_part.ok_or_else(|| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?;
        let int_str = std::str::from_utf8(int_bytes).map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?;
        let mut num: i64 = int_str.parse().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?;
        if sign == Some('-') {
            num = -num;
        }
        Ok((rest, Token::Integer(num)))
    }
}

/// Parse a literal string enclosed in parentheses.
///
/// Literal strings balance nested unescaped parentheses: `(Hello (World))`
/// is one token. Escape sequences (`\n`, `\(`, `\ddd`, line continuations)
/// are skipped over but returned raw; the parser decodes them.
fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (remaining, _) = char('(')(input)?;
    let mut depth = 1;
    let mut pos = 0;

    while depth > 0 && pos < remaining.len() {
        match remaining[pos] {
            b'\\' => {
                pos += 1;
                if pos < remaining.len() {
                    if remaining[pos].is_ascii_digit() {
                        // Octal escape, 1-3 digits
                        pos += 1;
                        if pos < remaining.len() && remaining[pos].is_ascii_digit() {
                            pos += 1;
                        }
                        if pos < remaining.len() && remaining[pos].is_ascii_digit() {
                            pos += 1;
                        }
                    } else {
                        pos += 1;
                    }
                }
            },
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                pos += 1;
            },
            _ => {
                pos += 1;
            },
        }
    }

    if depth != 0 {
        // Unterminated string
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    let content = &remaining[..pos - 1];
    Ok((&remaining[pos..], Token::LiteralString(content)))
}

/// Parse a hexadecimal string enclosed in angle brackets.
///
/// Interior whitespace is allowed and preserved; an odd number of digits is
/// padded with 0 by the parser. `<<` is a dictionary start, not a hex
/// string.
fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.len() >= 2 && input[0] == b'<' && input[1] == b'<' {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    delimited(
        char('<'),
        map(
            take_while(|c: u8| c.is_ascii_hexdigit() || is_pdf_whitespace(c)),
            Token::HexString,
        ),
        char('>'),
    )(input)
}

/// Decode #XX escape sequences in PDF names.
///
/// Name objects can contain any character encoded as `#XX` where XX is a
/// two-digit hexadecimal code; `/A#20B` decodes to `A B`. Invalid sequences
/// are preserved literally.
pub fn decode_name_escapes(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars();

    while let Some(ch) = chars.next() {
        if ch == '#' {
            let hex1 = chars.next();
            let hex2 = chars.next();

            if let (Some(h1), Some(h2)) = (hex1, hex2) {
                let hex_str = format!("{}{}", h1, h2);
                if let Ok(byte) = u8::from_str_radix(&hex_str, 16) {
                    result.push(byte as char);
                    continue;
                }
                result.push('#');
                result.push(h1);
                result.push(h2);
            } else if let Some(h1) = hex1 {
                result.push('#');
                result.push(h1);
            } else {
                result.push('#');
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Parse a name starting with /.
fn parse_name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    preceded(
        char('/'),
        map(
            take_while(|c: u8| !is_pdf_whitespace(c) && !is_pdf_delimiter(c)),
            |bytes: &[u8]| Token::Name(decode_name_escapes(&String::from_utf8_lossy(bytes))),
        ),
    )(input)
}

/// Parse the structural delimiters `<<`, `>>`, `[`, `]`.
fn parse_delimiter(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        map(tag("<<"), |_| Token::DictStart),
        map(tag(">>"), |_| Token::DictEnd),
        map(char('['), |_| Token::ArrayStart),
        map(char(']'), |_| Token::ArrayEnd),
    ))(input)
}

/// Check if a byte can start a keyword (operator name or true/false/null).
fn is_keyword_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || matches!(byte, b'\'' | b'"' | b'*')
}

/// Parse a bare keyword: an operator name, `R`, or true/false/null.
///
/// Operator names are 1-3 character sequences of letters plus the special
/// characters `'`, `"`, and `*` (for `'`, `"`, `T*`, `f*`, `W*`, `b*`,
/// `B*`).
fn parse_keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.first().copied().map(is_keyword_start) != Some(true) {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Alpha)));
    }

    let (rest, bytes) =
        take_while1(|c: u8| c.is_ascii_alphanumeric() || matches!(c, b'\'' | b'"' | b'*'))(input)?;

    let word = std::str::from_utf8(bytes).map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Alpha))
    })?;

    let tok = match word {
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => Token::Keyword(word),
    };
    Ok((rest, tok))
}

/// Parse the next token, skipping any leading whitespace and comments.
///
/// Fails (without consuming input) at end of stream or on bytes that do
/// not start any token.
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (input, _) = skip_ws(input)?;

    alt((
        parse_delimiter,
        parse_hex_string,
        parse_literal_string,
        parse_name,
        parse_number,
        parse_keyword,
    ))(input)
}
