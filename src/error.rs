//! Error types for the content-stream editing core.
//!
//! Every fallible operation in the crate reports one of the variants below.
//! A failed edit is atomic: no variant ever corresponds to a partially
//! rewritten stream.

/// Result type alias for editing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while locating or rewriting text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The content stream violates the operator grammar (unterminated
    /// string/array/dictionary, operand shape incompatible with the
    /// operator that follows). Fatal to the single call only.
    #[error("Malformed content stream at byte {offset}: {reason}")]
    MalformedStream {
        /// Byte offset in the stream where classification failed
        offset: usize,
        /// Reason the bytes could not be classified
        reason: String,
    },

    /// A font resource name referenced by a `Tf` operator is absent from
    /// the page's font table. Indicates an inconsistent document;
    /// surfaced as-is, never retried.
    #[error("Font resource not found: /{0}")]
    UnknownFont(String),

    /// The search string does not occur in the page's logical text.
    /// An expected negative result, not an exceptional condition.
    #[error("Text not found: {0:?}")]
    TextNotFound(String),

    /// The matched characters cross a font-change boundary, so it is
    /// ambiguous which font should govern the replacement.
    #[error("Match spans a font change (characters {start}..{end})")]
    SplitFontMatch {
        /// Logical character offset where the match starts
        start: usize,
        /// Logical character offset one past the match end
        end: usize,
    },

    /// The replacement text contains a character with no code in the
    /// active font's encoding. No font substitution is attempted.
    #[error("Character {ch:?} has no code in the encoding of font {font:?}")]
    UnencodableCharacter {
        /// The character that could not be encoded
        ch: char,
        /// Name of the font whose encoding was consulted
        font: String,
    },

    /// A page index beyond the document's page count was requested.
    #[error("Page index out of range: {0}")]
    PageOutOfRange(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_stream_message() {
        let err = Error::MalformedStream {
            offset: 42,
            reason: "unterminated string literal".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("42"));
        assert!(msg.contains("unterminated string literal"));
    }

    #[test]
    fn test_unknown_font_message() {
        let err = Error::UnknownFont("F9".to_string());
        assert!(format!("{}", err).contains("/F9"));
    }

    #[test]
    fn test_unencodable_character_message() {
        let err = Error::UnencodableCharacter {
            ch: '→',
            font: "Helvetica".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Helvetica"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
