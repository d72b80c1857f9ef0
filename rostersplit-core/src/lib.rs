// Rostersplit Core Library
//
// Splits multi-employee roster PDFs into one PDF per employee and period.
// Main interface is SplitProcessor (synchronous) and spawn_split (worker thread).

pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod classifier;
pub mod preprocessors;
pub mod storage;
pub mod events;
pub mod session;
pub mod processor;
pub mod worker;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{ExtractionError, SplitError};
pub use config::SplitterConfig;
pub use classifier::PageClassifier;
pub use preprocessors::{PdfPreprocessor, Preprocessor};
pub use storage::{artifact_file_name, sanitize, ArtifactStorage, PdfFileStorage};
pub use events::EventSink;
pub use session::{PageOutcome, Session, SessionBuilder};
pub use processor::SplitProcessor;
pub use worker::{spawn_split, SplitHandle};
