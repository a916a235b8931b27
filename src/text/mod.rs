//! Logical-text reconstruction.
//!
//! Bridges the gap between "text the user sees" and "bytes the rewriter
//! must change": [`TextRunModel`] is the logical character sequence of a
//! page plus, for every character, the operator and operand bytes that
//! painted it.

pub mod run_model;

pub use run_model::{CharacterSpan, SpanGroup, TextRunModel};
