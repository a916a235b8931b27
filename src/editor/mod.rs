//! Editing session: the one public operation and its collaborators.
//!
//! [`PageEditor`] wires the pipeline together — parse, model, locate,
//! rewrite, re-serialize — behind [`PageEditor::edit_text`]. It talks to
//! the surrounding document machinery only through the [`ObjectGraph`]
//! trait, which is the crate's entire dependency on the object-graph
//! layer.

pub mod rewriter;
pub mod session;

pub use rewriter::rewrite;
pub use session::{InMemoryGraph, ObjectGraph, PageEditor};
