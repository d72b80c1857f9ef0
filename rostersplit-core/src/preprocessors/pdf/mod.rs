//! PDF Preprocessor
//!
//! Page text comes from pdf-extract, which rebuilds lines from glyph
//! positions, so lines laid out inside a single text object still come out as
//! separate lines. The lopdf document is kept around so the output storage
//! can copy page subsets out of it without parsing the file again.

use crate::error::SplitError;
use crate::preprocessors::preprocessor::Preprocessor;
use crate::types::Page;
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

pub struct PdfPreprocessor {
    document: Document,
    /// lopdf page numbers (1-based) in document order
    page_numbers: Vec<u32>,
    /// Extracted text per page, same order as `page_numbers`
    page_texts: Vec<Option<String>>,
}

impl PdfPreprocessor {
    /// Load a PDF from disk
    pub fn open(path: &Path) -> Result<Self, SplitError> {
        if !path.is_file() {
            return Err(SplitError::SourceNotFound(path.to_path_buf()));
        }
        let pdf_bytes = std::fs::read(path).map_err(|e| SplitError::io(path, e))?;
        let preprocessor = Self::from_bytes(&pdf_bytes)?;
        tracing::debug!("Loaded {} ({} pages)", path.display(), preprocessor.page_count());
        Ok(preprocessor)
    }

    /// Load a PDF from memory
    pub fn from_bytes(pdf_bytes: &[u8]) -> Result<Self, SplitError> {
        let document = Document::load_mem(pdf_bytes)?;
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let page_texts = extract_page_texts(pdf_bytes, page_numbers.len());
        Ok(Self {
            document,
            page_numbers,
            page_texts,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// lopdf page number for a zero-based page index
    pub fn page_number(&self, index: usize) -> Option<u32> {
        self.page_numbers.get(index).copied()
    }
}

/// Text of every page, or all `None` when the document's text cannot be read.
///
/// pdf-extract panics on some malformed fonts; that is treated like any other
/// extraction failure so the pages still reach the session.
fn extract_page_texts(pdf_bytes: &[u8], page_count: usize) -> Vec<Option<String>> {
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));

    let pages = match extracted {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            tracing::warn!("Text extraction failed: {}", e);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("Text extraction aborted on a malformed page");
            Vec::new()
        }
    };
    if !pages.is_empty() && pages.len() != page_count {
        tracing::warn!(
            "Text extraction returned {} pages, document has {}",
            pages.len(),
            page_count
        );
    }

    let mut texts: Vec<Option<String>> = pages.iter().map(|text| clean_page_text(text)).collect();
    texts.resize(page_count, None);
    texts
}

/// Trim every line and drop the blank lines the extractor inserts for
/// vertical gaps. `None` when nothing is left.
fn clean_page_text(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

impl Preprocessor for PdfPreprocessor {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page(&self, index: usize) -> Page {
        let raw_text = self.page_texts.get(index).cloned().flatten();
        Page::new(index, raw_text)
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }
}
