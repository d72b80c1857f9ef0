//! Text parsing for roster pages
//!
//! Everything in here works on plain extracted text and knows nothing about
//! PDFs or output files:
//!
//! ```text
//! raw line ──► normalizer ──► name parser ──► (last name, first name)
//! page text ─────────────────► period extractor ──► YYYY_MM | YYYY_MM_DD
//! ```

pub mod name;
pub mod normalizer;
pub mod period;

pub use name::{parse_name, ParsedName};
pub use normalizer::normalize_line;
pub use period::{PeriodExtractor, ReportingPeriod};
