//! Page editing session and the object-graph boundary.

use crate::content::ContentStream;
use crate::editor::rewriter::rewrite;
use crate::error::{Error, Result};
use crate::fonts::FontTable;
use crate::search::locate_from;
use crate::text::TextRunModel;

/// The services the core consumes from the excluded object-graph layer.
///
/// Implementations are responsible for everything outside the content
/// stream itself: fetching objects by reference, running stream filters
/// (bytes handed to the core are decompressed, and bytes handed back are
/// recompressed by the implementation), resolving font dictionaries to
/// [`FontTable`] entries, updating the stream's length entry, and marking
/// affected cross-reference entries dirty for the next save.
pub trait ObjectGraph {
    /// Fetch one page's content stream, decompressed and filter-free.
    fn page_content_stream(&self, page_index: usize) -> Result<Vec<u8>>;

    /// The page's font resources, resolved to encodings.
    fn page_font_resources(&self, page_index: usize) -> Result<&FontTable>;

    /// Commit a rewritten content stream for the page.
    fn set_page_content_stream(&mut self, page_index: usize, bytes: Vec<u8>) -> Result<()>;
}

/// A trivial [`ObjectGraph`] holding pages in memory.
///
/// Suitable for tests and for embedders that do their own document I/O.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    pages: Vec<InMemoryPage>,
}

#[derive(Debug)]
struct InMemoryPage {
    content: Vec<u8>,
    fonts: FontTable,
}

impl InMemoryGraph {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page; returns its index.
    pub fn add_page(&mut self, content: Vec<u8>, fonts: FontTable) -> usize {
        self.pages.push(InMemoryPage { content, fonts });
        self.pages.len() - 1
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, page_index: usize) -> Result<&InMemoryPage> {
        self.pages.get(page_index).ok_or(Error::PageOutOfRange(page_index))
    }
}

impl ObjectGraph for InMemoryGraph {
    fn page_content_stream(&self, page_index: usize) -> Result<Vec<u8>> {
        Ok(self.page(page_index)?.content.clone())
    }

    fn page_font_resources(&self, page_index: usize) -> Result<&FontTable> {
        Ok(&self.page(page_index)?.fonts)
    }

    fn set_page_content_stream(&mut self, page_index: usize, bytes: Vec<u8>) -> Result<()> {
        let page = self
            .pages
            .get_mut(page_index)
            .ok_or(Error::PageOutOfRange(page_index))?;
        page.content = bytes;
        Ok(())
    }
}

/// Text-editing session over an object graph.
///
/// One edit operates on one page at a time: the content stream is decoded
/// fresh at the start of the call and committed back at the end. Nothing is
/// cached across calls, so independent sessions can edit different pages
/// concurrently.
pub struct PageEditor<G: ObjectGraph> {
    graph: G,
}

impl<G: ObjectGraph> PageEditor<G> {
    /// Create a session over an object graph.
    pub fn new(graph: G) -> Self {
        Self { graph }
    }

    /// Borrow the underlying graph.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Consume the session, returning the graph.
    pub fn into_inner(self) -> G {
        self.graph
    }

    /// The page's logical text, as reconstructed by the run model.
    ///
    /// Useful for verifying an edit landed and for diagnosing why a search
    /// string does not match (the rendered text may differ from what a
    /// viewer's copy-paste suggests).
    pub fn page_text(&self, page_index: usize) -> Result<String> {
        let data = self.graph.page_content_stream(page_index)?;
        let stream = ContentStream::parse(data)?;
        let model = TextRunModel::build(stream.operators(), self.graph.page_font_resources(page_index)?)?;
        Ok(model.logical_text().to_string())
    }

    /// Replace the first occurrence of `old_text` on the page with
    /// `new_text`.
    ///
    /// The call either fully succeeds or leaves the page's stream
    /// byte-for-byte untouched: the rewritten stream is committed through
    /// [`ObjectGraph::set_page_content_stream`] only after every fallible
    /// step has passed.
    ///
    /// # Errors
    ///
    /// Any [`Error`] variant from the pipeline: `MalformedStream`,
    /// `UnknownFont`, `TextNotFound`, `SplitFontMatch`,
    /// `UnencodableCharacter`, or the graph's own errors.
    pub fn edit_text(&mut self, page_index: usize, old_text: &str, new_text: &str) -> Result<()> {
        self.apply_edit(page_index, old_text, new_text, 0)?;
        Ok(())
    }

    /// Replace every occurrence of `old_text` on the page, left to right.
    ///
    /// Returns the number of occurrences rewritten; zero when the text does
    /// not occur at all. Each occurrence is one atomic edit — if a later
    /// occurrence fails (for example with `SplitFontMatch`), the error is
    /// surfaced and the earlier rewrites remain committed.
    pub fn edit_text_all(
        &mut self,
        page_index: usize,
        old_text: &str,
        new_text: &str,
    ) -> Result<usize> {
        let mut count = 0;
        let mut from = 0;

        loop {
            match self.apply_edit(page_index, old_text, new_text, from) {
                Ok(next_from) => {
                    count += 1;
                    from = next_from;
                },
                Err(Error::TextNotFound(_)) => break,
                Err(e) => return Err(e),
            }
        }

        log::debug!("page {}: {} occurrence(s) of {:?} replaced", page_index, count, old_text);
        Ok(count)
    }

    /// One full pipeline pass. Returns the logical offset just past the
    /// inserted replacement, for replace-all loops to resume from.
    fn apply_edit(
        &mut self,
        page_index: usize,
        old_text: &str,
        new_text: &str,
        from: usize,
    ) -> Result<usize> {
        let data = self.graph.page_content_stream(page_index)?;
        let fonts = self.graph.page_font_resources(page_index)?.clone();

        let stream = ContentStream::parse(data)?;
        let model = TextRunModel::build(stream.operators(), &fonts)?;
        let span = locate_from(&model, old_text, from)?;
        let new_ops = rewrite(stream.operators(), &model, &span, new_text, &fonts)?;

        let (bytes, length) = stream.with_operators(new_ops).serialize();
        log::debug!(
            "page {}: {:?} -> {:?} at chars {}..{}, stream now {} bytes",
            page_index,
            old_text,
            new_text,
            span.start,
            span.end,
            length
        );
        self.graph.set_page_content_stream(page_index, bytes)?;

        Ok(span.start + new_text.chars().count())
    }
}
