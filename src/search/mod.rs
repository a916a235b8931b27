//! Exact-match search over the reconstructed logical text.

pub mod locator;

pub use locator::{MatchSpan, locate, locate_from};
