use crate::error::ExtractionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ===== PAGE TYPES =====
// A Page is what the preprocessor hands over: a zero-based index and whatever
// text the PDF reader could recover. Pages are never mutated after reading.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Zero-based position in the source document
    pub index: usize,
    /// Extracted text, `None` when the reader recovered nothing
    pub raw_text: Option<String>,
}

impl Page {
    pub fn new(index: usize, raw_text: Option<String>) -> Self {
        Self { index, raw_text }
    }

    /// Page text or the empty string when nothing was extracted
    pub fn text(&self) -> &str {
        self.raw_text.as_deref().unwrap_or("")
    }
}

// ===== EXTRACTION TYPES =====

/// Identity of one output document: who the page belongs to and which
/// reporting period it covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub last_name: String,
    pub first_name: String,
    /// Either `YYYY_MM` (coarse) or `YYYY_MM_DD` (fine)
    pub period_key: String,
}

/// Successful result of running the name parser and period extractor on a page
pub type ExtractionResult = ArtifactKey;

/// Role a single page plays in the split
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRole {
    /// Page carries its own name and period, starts (or re-enters) an artifact
    New(ExtractionResult),
    /// Extraction failed but the page is marked as a follow-up page
    Continuation(ExtractionError),
    /// Extraction failed and nothing marks the page as a follow-up
    Unrecognized(ExtractionError),
}

// ===== ARTIFACT / SESSION TYPES =====

/// One output document under construction.
///
/// The key is fixed at creation; only `page_indices` grows, always in
/// ascending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    key: ArtifactKey,
    page_indices: Vec<usize>,
    /// Whether the file on disk holds the current `page_indices`
    written: bool,
}

impl Artifact {
    pub fn new(key: ArtifactKey, first_page: usize) -> Self {
        Self {
            key,
            page_indices: vec![first_page],
            written: false,
        }
    }

    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Record the outcome of the latest write of this artifact
    pub fn set_written(&mut self, written: bool) {
        self.written = written;
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn page_indices(&self) -> &[usize] {
        &self.page_indices
    }

    /// Append a page. Returns false (and leaves the artifact untouched) if the
    /// index would break the strictly increasing order.
    pub fn push_page(&mut self, index: usize) -> bool {
        match self.page_indices.last() {
            Some(&last) if index <= last => false,
            _ => {
                self.page_indices.push(index);
                true
            }
        }
    }
}

/// What the caller asks for: one source document and an optional target root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRequest {
    pub source: PathBuf,
    /// Caller-chosen directory; the `"{stem} Splitted"` subdirectory is created inside it
    pub output_root: Option<PathBuf>,
}

impl SplitRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_root: None,
        }
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }
}

// ===== EVENT TYPES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Messages flowing from the worker to the caller, in page-processing order
#[derive(Debug, Clone, PartialEq)]
pub enum SplitEvent {
    Log { level: LogLevel, message: String },
    /// 0..=100, keyed to pages processed / total pages
    Progress(u8),
    Completed(SplitSummary),
    Failed(String),
}

// ===== SUMMARY TYPES =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub file_name: String,
    pub key: ArtifactKey,
    pub page_indices: Vec<usize>,
    /// False when the last write of this artifact failed
    pub written: bool,
    /// A later artifact in the same run wrote to the same file name
    pub overwritten: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedPage {
    pub index: usize,
    pub reason: String,
}

/// Result of one complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub total_pages: usize,
    pub artifacts: Vec<ArtifactSummary>,
    pub dropped_pages: Vec<DroppedPage>,
    pub finished_at: DateTime<Utc>,
}

impl SplitSummary {
    /// File names successfully written during the run, sorted and deduplicated
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .artifacts
            .iter()
            .filter(|a| a.written)
            .map(|a| a.file_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Save as pretty-printed JSON, creating parent directories as needed
    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
