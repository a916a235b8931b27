//! Bidirectional font encodings (character code ↔ Unicode).
//!
//! A [`FontEncoding`] is the resolved code table of one font: it decodes
//! the raw bytes of show-text operands into Unicode characters and
//! re-encodes replacement text back into character codes. Codes are one
//! byte wide for simple fonts and two bytes (big-endian) for CID fonts
//! with Identity-style CMaps.
//!
//! The built-in [`FontEncoding::winansi`] constructor covers the common
//! case of the standard Latin text fonts without needing a font parser.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Width of one character code in the encoded byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeWidth {
    /// One byte per code (simple fonts)
    One,
    /// Two bytes per code, big-endian (CID fonts, Identity-H)
    Two,
}

/// One character decoded from a show-text operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedChar {
    /// The Unicode character
    pub ch: char,
    /// Offset of the code's first byte within the operand string
    pub start: usize,
    /// Number of code bytes (1 or 2)
    pub len: usize,
}

/// The resolved encoding of one font.
///
/// Fixed for the duration of an edit; the core never mutates it.
#[derive(Debug, Clone)]
pub struct FontEncoding {
    name: String,
    code_width: CodeWidth,
    to_unicode: HashMap<u16, char>,
    from_unicode: HashMap<char, u16>,
}

impl FontEncoding {
    /// Build an encoding from (code, character) pairs.
    ///
    /// The inverse table for re-encoding is derived automatically; when two
    /// codes map to the same character, the first pair wins for encoding.
    pub fn new(
        name: impl Into<String>,
        code_width: CodeWidth,
        pairs: impl IntoIterator<Item = (u16, char)>,
    ) -> Self {
        let mut to_unicode = HashMap::new();
        let mut from_unicode = HashMap::new();
        for (code, ch) in pairs {
            to_unicode.insert(code, ch);
            from_unicode.entry(ch).or_insert(code);
        }
        Self {
            name: name.into(),
            code_width,
            to_unicode,
            from_unicode,
        }
    }

    /// The WinAnsi (Windows-1252) single-byte encoding, the default for the
    /// standard Latin text fonts.
    pub fn winansi(name: impl Into<String>) -> Self {
        Self::new(
            name,
            CodeWidth::One,
            (0x20u16..=0xFF).filter_map(|code| winansi_to_unicode(code as u8).map(|ch| (code, ch))),
        )
    }

    /// Font name (for diagnostics and error values).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width of one character code.
    pub fn code_width(&self) -> CodeWidth {
        self.code_width
    }

    /// Decode operand bytes into characters with their code byte ranges.
    ///
    /// Codes missing from the table decode to U+FFFD (and are logged);
    /// dropping them instead would silently shift every later offset in the
    /// span table. For two-byte encodings an odd trailing byte is padded
    /// with zero, mirroring hex-string padding.
    pub fn decode(&self, bytes: &[u8]) -> Vec<DecodedChar> {
        let mut out = Vec::with_capacity(bytes.len());
        match self.code_width {
            CodeWidth::One => {
                for (i, &b) in bytes.iter().enumerate() {
                    out.push(DecodedChar {
                        ch: self.lookup(b as u16),
                        start: i,
                        len: 1,
                    });
                }
            },
            CodeWidth::Two => {
                let mut i = 0;
                while i < bytes.len() {
                    let (code, len) = if i + 1 < bytes.len() {
                        ((bytes[i] as u16) << 8 | bytes[i + 1] as u16, 2)
                    } else {
                        log::warn!(
                            "odd byte count in two-byte encoded string for font {:?}",
                            self.name
                        );
                        ((bytes[i] as u16) << 8, 1)
                    };
                    out.push(DecodedChar {
                        ch: self.lookup(code),
                        start: i,
                        len,
                    });
                    i += len;
                }
            },
        }
        out
    }

    fn lookup(&self, code: u16) -> char {
        match self.to_unicode.get(&code) {
            Some(&ch) => ch,
            None => {
                log::debug!("code {:#06x} not in encoding of font {:?}", code, self.name);
                char::REPLACEMENT_CHARACTER
            },
        }
    }

    /// Re-encode text into this font's character codes.
    ///
    /// # Errors
    ///
    /// Returns the first character with no code in the table. No fallback
    /// or substitution is attempted.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, char> {
        let bytes_per_code = match self.code_width {
            CodeWidth::One => 1,
            CodeWidth::Two => 2,
        };
        let mut out = Vec::with_capacity(text.len() * bytes_per_code);

        for ch in text.chars() {
            let code = *self.from_unicode.get(&ch).ok_or(ch)?;
            match self.code_width {
                CodeWidth::One => out.push(code as u8),
                CodeWidth::Two => out.extend_from_slice(&code.to_be_bytes()),
            }
        }
        Ok(out)
    }

    /// Whether a character can be encoded by this font.
    pub fn can_encode(&self, ch: char) -> bool {
        self.from_unicode.contains_key(&ch)
    }
}

/// WinAnsi (Windows-1252) byte to Unicode.
///
/// ASCII and the Latin-1 range 0xA0-0xFF map directly; 0x80-0x9F holds the
/// Windows-specific characters. The five unassigned bytes return None.
fn winansi_to_unicode(byte: u8) -> Option<char> {
    if (0x20..0x80).contains(&byte) || byte >= 0xA0 {
        return char::from_u32(byte as u32);
    }

    match byte {
        0x80 => Some('\u{20AC}'), // Euro sign
        0x82 => Some('\u{201A}'), // Single low-9 quotation mark
        0x83 => Some('\u{0192}'), // Latin small letter f with hook
        0x84 => Some('\u{201E}'), // Double low-9 quotation mark
        0x85 => Some('\u{2026}'), // Horizontal ellipsis
        0x86 => Some('\u{2020}'), // Dagger
        0x87 => Some('\u{2021}'), // Double dagger
        0x88 => Some('\u{02C6}'), // Modifier letter circumflex accent
        0x89 => Some('\u{2030}'), // Per mille sign
        0x8A => Some('\u{0160}'), // Latin capital letter S with caron
        0x8B => Some('\u{2039}'), // Single left-pointing angle quotation mark
        0x8C => Some('\u{0152}'), // Latin capital ligature OE
        0x8E => Some('\u{017D}'), // Latin capital letter Z with caron
        0x91 => Some('\u{2018}'), // Left single quotation mark
        0x92 => Some('\u{2019}'), // Right single quotation mark
        0x93 => Some('\u{201C}'), // Left double quotation mark
        0x94 => Some('\u{201D}'), // Right double quotation mark
        0x95 => Some('\u{2022}'), // Bullet
        0x96 => Some('\u{2013}'), // En dash
        0x97 => Some('\u{2014}'), // Em dash
        0x98 => Some('\u{02DC}'), // Small tilde
        0x99 => Some('\u{2122}'), // Trade mark sign
        0x9A => Some('\u{0161}'), // Latin small letter s with caron
        0x9B => Some('\u{203A}'), // Single right-pointing angle quotation mark
        0x9C => Some('\u{0153}'), // Latin small ligature oe
        0x9E => Some('\u{017E}'), // Latin small letter z with caron
        0x9F => Some('\u{0178}'), // Latin capital letter Y with diaeresis
        _ => None,
    }
}

lazy_static! {
    /// Inverse WinAnsi table (Unicode to byte), derived from the forward
    /// mapping so the two can never drift apart.
    static ref UNICODE_TO_WINANSI: HashMap<char, u8> = (0x20u8..=0xFF)
        .filter_map(|b| winansi_to_unicode(b).map(|ch| (ch, b)))
        .collect();
}

/// Check if a character can be encoded in WinAnsi.
pub fn is_winansi_char(ch: char) -> bool {
    UNICODE_TO_WINANSI.contains_key(&ch)
}
