// Preprocessor abstraction for roster splitting
//
// This module defines the boundary between reading a source document
// (PDF -> page texts) and the text-only classification that follows. Anything
// that can report a page count and hand out per-page text can feed the session.

use crate::types::Page;

/// Preprocessor trait - turns a source document into pages of text
///
/// The page count is known up front so the session can report progress.
/// A page whose text cannot be recovered is still a page: it comes back with
/// `raw_text: None` rather than as an error.
pub trait Preprocessor {
    /// Number of pages in the source document
    fn page_count(&self) -> usize;

    /// Extract one page (zero-based index)
    fn page(&self, index: usize) -> Page;

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;
}
