//! Source document preprocessors
//!
//! Preprocessors turn a source document into an ordered list of pages with
//! extracted text. The session only ever sees `Page`s.
//!
//! ## Architecture
//!
//! ```text
//! Roster PDF
//!     ↓
//! [PdfPreprocessor]  (lopdf text extraction)
//!     ↓
//! Vec<Page> { index, raw_text }
//!     ↓
//! [PageClassifier → SessionBuilder]
//! ```

pub mod pdf;
pub mod preprocessor;

// Re-export main types
pub use pdf::PdfPreprocessor;
pub use preprocessor::Preprocessor;
