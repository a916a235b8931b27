//! # pdf_retext
//!
//! In-place text editing for PDF page content streams.
//!
//! A PDF page does not store text as text: it stores a content stream of
//! positioned glyph-show operators, with the characters encoded through a
//! per-font code table and frequently split across several operators and
//! kerning adjustments. This crate solves the editing half of that problem:
//! given the decompressed content stream of one page and the resolved
//! encodings of its fonts, it
//!
//! 1. tokenizes the stream into operators ([`content`]),
//! 2. rebuilds the logical character sequence together with a map from each
//!    character back to the operator bytes that painted it ([`text`]),
//! 3. locates an exact occurrence of the requested string ([`search`]),
//! 4. rewrites the covered show-text operands with the re-encoded
//!    replacement ([`editor`]), and
//! 5. re-serializes the stream so that every operator outside the edit is
//!    byte-identical to the input ([`content::serializer`]).
//!
//! Object-graph concerns — fetching and decompressing streams, resolving
//! font dictionaries to encodings, updating cross-reference entries — are
//! deliberately outside this crate. Callers supply them through the narrow
//! [`editor::ObjectGraph`] trait.
//!
//! ## Quick start
//!
//! ```
//! use pdf_retext::editor::{InMemoryGraph, PageEditor};
//! use pdf_retext::fonts::{FontEncoding, FontTable};
//!
//! # fn main() -> pdf_retext::Result<()> {
//! let mut fonts = FontTable::new();
//! fonts.insert("F1", FontEncoding::winansi("Helvetica"));
//!
//! let mut graph = InMemoryGraph::new();
//! graph.add_page(b"BT /F1 12 Tf 72 720 Td (Hello World) Tj ET".to_vec(), fonts);
//!
//! let mut editor = PageEditor::new(graph);
//! editor.edit_text(0, "World", "Earth")?;
//! assert_eq!(editor.page_text(0)?, "Hello Earth");
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Every failure is a typed [`Error`]; a failed edit leaves the page's
//! stream byte-for-byte as it was. There are no retries and no partial
//! writes.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Content-stream primitives
pub mod content;
pub mod lexer;
pub mod object;

// Font encodings (code <-> Unicode)
pub mod fonts;

// Logical-text reconstruction and search
pub mod search;
pub mod text;

// Editing session and rewriter
pub mod editor;

pub use content::ContentStream;
pub use editor::{InMemoryGraph, ObjectGraph, PageEditor};
pub use error::{Error, Result};
