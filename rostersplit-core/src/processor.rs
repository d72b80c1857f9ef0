use crate::classifier::PageClassifier;
use crate::config::SplitterConfig;
use crate::error::SplitError;
use crate::events::EventSink;
use crate::preprocessors::{PdfPreprocessor, Preprocessor};
use crate::session::SessionBuilder;
use crate::storage::{ArtifactStorage, PdfFileStorage};
use crate::types::*;
use std::path::Path;
use std::time::Instant;

/// Splits one roster document per call.
///
/// Holds no per-run state; each `run` builds its own session, so one processor
/// can be reused for several documents (one after another).
pub struct SplitProcessor {
    config: SplitterConfig,
    classifier: PageClassifier,
}

impl Default for SplitProcessor {
    fn default() -> Self {
        Self::new(SplitterConfig::default())
    }
}

impl SplitProcessor {
    pub fn new(config: SplitterConfig) -> Self {
        let classifier = PageClassifier::new(config.markers.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split the requested document and report the outcome on `events`.
    ///
    /// Ends the event stream with exactly one `Completed` or `Failed` event.
    /// Files written before a failure stay on disk.
    pub fn run(
        &self,
        request: &SplitRequest,
        events: &mut dyn EventSink,
    ) -> Result<SplitSummary, SplitError> {
        match self.try_run(request, events) {
            Ok(summary) => {
                events.emit(SplitEvent::Completed(summary.clone()));
                Ok(summary)
            }
            Err(e) => {
                events.error(format!("Unexpected error: {e}"));
                events.emit(SplitEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn try_run(
        &self,
        request: &SplitRequest,
        events: &mut dyn EventSink,
    ) -> Result<SplitSummary, SplitError> {
        let start_time = Instant::now();

        if !request.source.is_file() {
            return Err(SplitError::SourceNotFound(request.source.clone()));
        }

        let output_dir = self
            .config
            .resolve_output_dir(&request.source, request.output_root.as_deref())?;
        let preprocessor = PdfPreprocessor::open(&request.source)?;
        let storage = PdfFileStorage::new(&preprocessor, &output_dir)?;

        tracing::info!(
            "Splitting {} into {} ({})",
            request.source.display(),
            output_dir.display(),
            preprocessor.name()
        );
        let summary = self.split_pages(&preprocessor, storage, &request.source, events);
        tracing::info!(
            "Split {} pages into {} documents in {:.3}s",
            summary.total_pages,
            summary.artifacts.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(summary)
    }

    /// Run the session over every page of `source`, strictly in order.
    ///
    /// Never fails: per-page problems are reported on `events` and recorded
    /// in the summary's dropped pages.
    pub fn split_pages<P, S>(
        &self,
        source: &P,
        storage: S,
        source_path: &Path,
        events: &mut dyn EventSink,
    ) -> SplitSummary
    where
        P: Preprocessor + ?Sized,
        S: ArtifactStorage,
    {
        let total_pages = source.page_count();
        let mut builder = SessionBuilder::new(&self.classifier, storage, source_path);

        for index in 0..total_pages {
            events.info(format!("Processing page {} of {}", index + 1, total_pages));
            let page = source.page(index);
            self.preview_text(&page, events);
            builder.process_page(&page, events);
            events.progress(index + 1, total_pages);
        }

        events.progress(total_pages, total_pages);
        events.info("Processing complete".to_string());
        builder.into_session().summary(total_pages)
    }

    fn preview_text(&self, page: &Page, events: &mut dyn EventSink) {
        let limit = self.config.debug.text_preview_chars;
        if limit == 0 {
            return;
        }

        events.debug(format!("--- Text of page {} ---", page.index + 1));
        match &page.raw_text {
            Some(text) => {
                let preview: String = text.chars().take(limit).collect();
                events.debug(preview.replace('\n', "\\n"));
            }
            None => events.debug("No text found on this page.".to_string()),
        }
    }
}
