use crate::classifier::PageClassifier;
use crate::error::ExtractionError;
use crate::events::EventSink;
use crate::storage::{artifact_file_name, ArtifactStorage};
use crate::types::*;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// State of one run over one source document.
///
/// Artifacts live in a plain vector; `current` is an index into it and only
/// ever points at the most recently created artifact.
#[derive(Debug, Clone)]
pub struct Session {
    source_path: PathBuf,
    output_dir: PathBuf,
    artifacts: Vec<Artifact>,
    current: Option<usize>,
    dropped: Vec<DroppedPage>,
}

impl Session {
    pub fn new(source_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            output_dir: output_dir.into(),
            artifacts: Vec::new(),
            current: None,
            dropped: Vec::new(),
        }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn current_artifact(&self) -> Option<&Artifact> {
        self.current.and_then(|i| self.artifacts.get(i))
    }

    pub fn dropped_pages(&self) -> &[DroppedPage] {
        &self.dropped
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn summary(&self, total_pages: usize) -> SplitSummary {
        let file_names: Vec<String> = self
            .artifacts
            .iter()
            .map(|a| artifact_file_name(a.key()))
            .collect();

        SplitSummary {
            source: self.source_path.clone(),
            output_dir: self.output_dir.clone(),
            total_pages,
            artifacts: self
                .artifacts
                .iter()
                .zip(&file_names)
                .enumerate()
                .map(|(i, (a, file_name))| ArtifactSummary {
                    file_name: file_name.clone(),
                    key: a.key().clone(),
                    page_indices: a.page_indices().to_vec(),
                    written: a.is_written(),
                    overwritten: file_names[i + 1..].contains(file_name),
                })
                .collect(),
            dropped_pages: self.dropped.clone(),
            finished_at: Utc::now(),
        }
    }

    fn create(&mut self, key: ArtifactKey, page_index: usize) -> usize {
        self.artifacts.push(Artifact::new(key, page_index));
        let handle = self.artifacts.len() - 1;
        self.current = Some(handle);
        handle
    }

    fn drop_page(&mut self, index: usize, reason: &ExtractionError) {
        self.dropped.push(DroppedPage {
            index,
            reason: reason.to_string(),
        });
    }
}

/// What happened to one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A new artifact was started (handle into `Session::artifacts`)
    Created(usize),
    /// The page was added to an existing artifact
    Appended(usize),
    Dropped(ExtractionError),
    /// Index not greater than the previous page's
    OutOfOrder,
}

/// Feeds pages through the classifier in ascending order and keeps the
/// storage in sync with the session after every page.
pub struct SessionBuilder<'a, S: ArtifactStorage> {
    classifier: &'a PageClassifier,
    storage: S,
    session: Session,
    last_index: Option<usize>,
}

impl<'a, S: ArtifactStorage> SessionBuilder<'a, S> {
    pub fn new(classifier: &'a PageClassifier, storage: S, source_path: impl Into<PathBuf>) -> Self {
        let session = Session::new(source_path, storage.output_dir().to_path_buf());
        Self {
            classifier,
            storage,
            session,
            last_index: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn process_page(&mut self, page: &Page, events: &mut dyn EventSink) -> PageOutcome {
        let number = page.index + 1;
        if self.last_index.is_some_and(|last| page.index <= last) {
            events.error(format!("Page {number} arrived out of order, skipping"));
            return PageOutcome::OutOfOrder;
        }
        self.last_index = Some(page.index);

        match self.classifier.classify(page) {
            PageRole::New(key) => self.start_or_extend(key, page.index, events),
            PageRole::Continuation(_) => {
                events.info("Continuation page detected, appending to previous document".to_string());
                match self.session.current {
                    Some(handle) => self.append(handle, page.index, events),
                    None => {
                        let reason = ExtractionError::PageContinuationWithoutPredecessor;
                        events.warn(format!("Warning: no previous document to append page {number} to"));
                        self.session.drop_page(page.index, &reason);
                        PageOutcome::Dropped(reason)
                    }
                }
            }
            PageRole::Unrecognized(reason) => {
                events.warn(format!(
                    "Warning: no complete information found on page {number} ({reason})"
                ));
                self.session.drop_page(page.index, &reason);
                PageOutcome::Dropped(reason)
            }
        }
    }

    /// A page with its own header whose key matches the current artifact
    /// belongs to that artifact; any other key starts a new one.
    fn start_or_extend(&mut self, key: ArtifactKey, index: usize, events: &mut dyn EventSink) -> PageOutcome {
        if let Some(handle) = self.session.current {
            if self.session.artifacts[handle].key() == &key {
                return self.append(handle, index, events);
            }
        }

        let file_name = artifact_file_name(&key);
        if self
            .session
            .artifacts
            .iter()
            .any(|a| artifact_file_name(a.key()) == file_name)
        {
            events.warn(format!("Warning: {file_name} already written earlier in this run, overwriting"));
        }

        let handle = self.session.create(key, index);
        if self.write(handle, index, events) {
            events.info(format!("Created: {file_name}"));
        }
        PageOutcome::Created(handle)
    }

    fn append(&mut self, handle: usize, index: usize, events: &mut dyn EventSink) -> PageOutcome {
        // last_index guarantees ascending order, so push_page cannot refuse
        self.session.artifacts[handle].push_page(index);
        if self.write(handle, index, events) {
            let file_name = artifact_file_name(self.session.artifacts[handle].key());
            events.info(format!("Updated (with appended page): {file_name}"));
        }
        PageOutcome::Appended(handle)
    }

    /// Rewrite the whole artifact. Failures are reported and the run goes on;
    /// the next successful write for this artifact includes the page again.
    fn write(&mut self, handle: usize, index: usize, events: &mut dyn EventSink) -> bool {
        let artifact = &self.session.artifacts[handle];
        let file_name = artifact_file_name(artifact.key());
        let written = match self.storage.write_artifact(&file_name, artifact.page_indices()) {
            Ok(path) => {
                tracing::debug!("Wrote {} ({} pages)", path.display(), artifact.page_indices().len());
                true
            }
            Err(e) => {
                events.error(format!("Error on page {}: {e}", index + 1));
                false
            }
        };
        self.session.artifacts[handle].set_written(written);
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitError;
    use std::collections::HashMap;

    /// Remembers the last page list written per file name
    #[derive(Default)]
    struct MemoryStorage {
        files: HashMap<String, Vec<usize>>,
        writes: usize,
        fail_on: Option<String>,
    }

    impl ArtifactStorage for &mut MemoryStorage {
        fn write_artifact(&mut self, file_name: &str, page_indices: &[usize]) -> Result<PathBuf, SplitError> {
            if self.fail_on.as_deref() == Some(file_name) {
                return Err(SplitError::io(
                    file_name,
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                ));
            }
            self.writes += 1;
            self.files.insert(file_name.to_string(), page_indices.to_vec());
            Ok(PathBuf::from(file_name))
        }

        fn output_dir(&self) -> &Path {
            Path::new("memory")
        }
    }

    const HEADER: &str = "Herr/Frau\nText5: Max Mustermann\nZeitraum: Januar 2024 01.01.2024 - 31.01.2024";
    const OTHER_HEADER: &str = "Herr/Frau\nText5: Anna Schulz\nZeitraum: Januar 2024 01.01.2024 - 31.01.2024";
    const MAX_FILE: &str = "Mustermann_Max_2024_01_31.pdf";
    const ANNA_FILE: &str = "Schulz_Anna_2024_01_31.pdf";

    fn run(texts: &[Option<&str>], storage: &mut MemoryStorage) -> (Session, Vec<PageOutcome>, Vec<SplitEvent>) {
        let classifier = PageClassifier::default();
        let mut builder = SessionBuilder::new(&classifier, storage, "roster.pdf");
        let mut events: Vec<SplitEvent> = Vec::new();
        let outcomes = texts
            .iter()
            .enumerate()
            .map(|(i, text)| builder.process_page(&Page::new(i, text.map(str::to_string)), &mut events))
            .collect();
        (builder.into_session(), outcomes, events)
    }

    fn warnings(events: &[SplitEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SplitEvent::Log { level: LogLevel::Warn, .. }))
            .count()
    }

    #[test]
    fn test_new_continuation_unrecognized() {
        let mut storage = MemoryStorage::default();
        let (session, outcomes, events) = run(
            &[Some(HEADER), Some("Seite 2\nweitere Schichten"), Some("Aushang Kantine")],
            &mut storage,
        );

        assert_eq!(
            outcomes,
            vec![
                PageOutcome::Created(0),
                PageOutcome::Appended(0),
                PageOutcome::Dropped(ExtractionError::MissingNameMarker),
            ]
        );
        assert_eq!(session.artifacts().len(), 1);
        assert_eq!(session.artifacts()[0].page_indices(), &[0, 1]);
        assert_eq!(storage.files.get(MAX_FILE), Some(&vec![0, 1]));
        assert_eq!(storage.files.len(), 1);
        assert_eq!(storage.writes, 2);
        assert_eq!(session.dropped_pages().len(), 1);
        assert_eq!(session.dropped_pages()[0].index, 2);
        assert_eq!(warnings(&events), 1);
    }

    #[test]
    fn test_continuation_without_predecessor_is_dropped() {
        let mut storage = MemoryStorage::default();
        let (session, outcomes, _) = run(&[Some("Seite 2"), Some(HEADER)], &mut storage);

        assert_eq!(
            outcomes[0],
            PageOutcome::Dropped(ExtractionError::PageContinuationWithoutPredecessor)
        );
        assert_eq!(outcomes[1], PageOutcome::Created(0));
        assert_eq!(session.artifacts()[0].page_indices(), &[1]);
    }

    #[test]
    fn test_unrecognized_page_keeps_current_artifact() {
        let mut storage = MemoryStorage::default();
        let (session, _, _) = run(
            &[Some(HEADER), None, Some("Seite 2")],
            &mut storage,
        );
        assert_eq!(session.artifacts()[0].page_indices(), &[0, 2]);
        assert_eq!(session.current_artifact().map(|a| a.page_indices().len()), Some(2));
    }

    #[test]
    fn test_continuation_goes_to_most_recent_artifact() {
        let mut storage = MemoryStorage::default();
        let (session, _, _) = run(
            &[Some(HEADER), Some(OTHER_HEADER), Some("Seite 2")],
            &mut storage,
        );
        assert_eq!(session.artifacts().len(), 2);
        assert_eq!(storage.files.get(MAX_FILE), Some(&vec![0]));
        assert_eq!(storage.files.get(ANNA_FILE), Some(&vec![1, 2]));
    }

    #[test]
    fn test_repeated_header_extends_current_artifact() {
        let mut storage = MemoryStorage::default();
        let (session, outcomes, _) = run(&[Some(HEADER), Some(HEADER)], &mut storage);
        assert_eq!(outcomes, vec![PageOutcome::Created(0), PageOutcome::Appended(0)]);
        assert_eq!(session.artifacts().len(), 1);
        assert_eq!(storage.files.get(MAX_FILE), Some(&vec![0, 1]));
    }

    #[test]
    fn test_same_key_after_other_employee_starts_new_artifact() {
        let mut storage = MemoryStorage::default();
        let (session, _, events) = run(&[Some(HEADER), Some(OTHER_HEADER), Some(HEADER)], &mut storage);
        assert_eq!(session.artifacts().len(), 3);
        assert_eq!(storage.files.get(MAX_FILE), Some(&vec![2]));
        assert_eq!(warnings(&events), 1);

        let summary = session.summary(3);
        let overwritten: Vec<bool> = summary.artifacts.iter().map(|a| a.overwritten).collect();
        assert_eq!(overwritten, vec![true, false, false]);
        assert_eq!(summary.file_names(), vec![MAX_FILE.to_string(), ANNA_FILE.to_string()]);
    }

    #[test]
    fn test_write_failure_does_not_stop_session() {
        let mut storage = MemoryStorage {
            fail_on: Some(MAX_FILE.to_string()),
            ..MemoryStorage::default()
        };
        let (session, outcomes, events) = run(&[Some(HEADER), Some(OTHER_HEADER)], &mut storage);
        assert_eq!(outcomes, vec![PageOutcome::Created(0), PageOutcome::Created(1)]);
        assert_eq!(session.artifacts().len(), 2);
        assert!(storage.files.contains_key(ANNA_FILE));
        assert!(events
            .iter()
            .any(|e| matches!(e, SplitEvent::Log { level: LogLevel::Error, .. })));

        let summary = session.summary(2);
        assert!(!summary.artifacts[0].written);
        assert!(summary.artifacts[1].written);
        assert_eq!(summary.file_names(), vec![ANNA_FILE.to_string()]);
    }

    #[test]
    fn test_out_of_order_page_rejected() {
        let classifier = PageClassifier::default();
        let mut storage = MemoryStorage::default();
        let mut builder = SessionBuilder::new(&classifier, &mut storage, "roster.pdf");
        let mut events: Vec<SplitEvent> = Vec::new();
        builder.process_page(&Page::new(3, Some(HEADER.to_string())), &mut events);
        let outcome = builder.process_page(&Page::new(1, Some("Seite 2".to_string())), &mut events);
        assert_eq!(outcome, PageOutcome::OutOfOrder);
        assert_eq!(builder.session().artifacts()[0].page_indices(), &[3]);
    }

    #[test]
    fn test_summary_lists_files() {
        let mut storage = MemoryStorage::default();
        let (session, _, _) = run(&[Some(HEADER), Some(OTHER_HEADER), Some("leer")], &mut storage);
        let summary = session.summary(3);
        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.file_names(), vec![MAX_FILE.to_string(), ANNA_FILE.to_string()]);
        assert_eq!(summary.dropped_pages.len(), 1);
        assert_eq!(summary.output_dir, PathBuf::from("memory"));
    }
}
