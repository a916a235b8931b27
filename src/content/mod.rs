//! Content-stream parsing, representation, and re-serialization.
//!
//! A [`ContentStream`] couples the source bytes of one page's content
//! stream with its parsed operator sequence. Operators lexed from the
//! source carry their byte span, which is what lets
//! [`ContentStream::serialize`] reproduce untouched operators
//! byte-for-byte; operators synthesized by a rewrite carry no span and are
//! emitted canonically.

pub mod graphics_state;
pub mod operators;
pub mod parser;
pub mod serializer;

pub use graphics_state::{Matrix, TextState, TextStateStack};
pub use operators::Operator;
pub use parser::tokenize;

use crate::error::Result;
use bytes::Bytes;

/// One page's content stream: source bytes plus parsed operators.
///
/// Owned exclusively by the editing session for one page at a time. The
/// source bytes are immutable; rewriting produces a new operator list and a
/// new serialized byte vector, never an in-place mutation.
#[derive(Debug, Clone)]
pub struct ContentStream {
    data: Bytes,
    ops: Vec<Operator>,
    /// Byte offset where trailing whitespace/comments after the final
    /// operator begin.
    tail: usize,
}

impl ContentStream {
    /// Parse a content stream from raw (already decompressed) bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedStream`] when the bytes violate the
    /// operator grammar.
    pub fn parse(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let ops = tokenize(&data)?;
        let tail = ops.iter().filter_map(|op| op.span.as_ref()).map(|r| r.end).max().unwrap_or(0);
        Ok(Self { data, ops, tail })
    }

    /// The parsed operator sequence.
    pub fn operators(&self) -> &[Operator] {
        &self.ops
    }

    /// The source bytes this stream was parsed from.
    pub fn source(&self) -> &[u8] {
        &self.data
    }

    /// Produce a new stream with a rewritten operator sequence, sharing the
    /// original source bytes (needed to re-emit untouched operators
    /// verbatim).
    pub fn with_operators(&self, ops: Vec<Operator>) -> Self {
        Self {
            data: self.data.clone(),
            ops,
            tail: self.tail,
        }
    }

    /// Serialize the operator sequence back to bytes.
    ///
    /// Returns the bytes together with their length so the caller can
    /// update the stream object's length entry.
    pub fn serialize(&self) -> (Vec<u8>, usize) {
        serializer::serialize(&self.data, &self.ops, self.tail)
    }
}
