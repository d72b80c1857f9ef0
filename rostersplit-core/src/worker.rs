//! Background split runs
//!
//! A run happens on its own thread so a UI or CLI loop stays responsive. The
//! caller polls the handle for events; the channel preserves emission order.

use crate::error::SplitError;
use crate::processor::SplitProcessor;
use crate::types::{SplitEvent, SplitRequest, SplitSummary};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Handle to a split running on a worker thread.
///
/// There is no cancellation: dropping the handle detaches the worker, which
/// finishes the document on its own.
pub struct SplitHandle {
    events: Receiver<SplitEvent>,
    thread: JoinHandle<Result<SplitSummary, SplitError>>,
}

/// Start splitting `request` on a new thread
pub fn spawn_split(processor: SplitProcessor, request: SplitRequest) -> Result<SplitHandle, SplitError> {
    let (sender, events) = mpsc::channel::<SplitEvent>();
    let source = request.source.clone();

    let thread = thread::Builder::new()
        .name("rostersplit-worker".to_string())
        .spawn(move || {
            let mut sender = sender;
            tracing::info!("Worker started for {}", request.source.display());
            let result = processor.run(&request, &mut sender);
            match &result {
                Ok(summary) => tracing::info!(
                    "Worker finished: {} documents from {} pages",
                    summary.artifacts.len(),
                    summary.total_pages
                ),
                Err(e) => tracing::error!("Worker failed: {}", e),
            }
            result
        })
        .map_err(|e| SplitError::io(source, e))?;

    Ok(SplitHandle { events, thread })
}

impl SplitHandle {
    /// Drain every event emitted since the last poll without blocking
    pub fn poll(&self) -> Vec<SplitEvent> {
        self.events.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event
    pub fn next_event(&self, timeout: Duration) -> Option<SplitEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the worker is done. Events not yet polled are discarded.
    pub fn join(self) -> Result<SplitSummary, SplitError> {
        self.thread.join().map_err(|_| SplitError::WorkerPanicked)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_reports_failure() {
        let handle = spawn_split(
            SplitProcessor::default(),
            SplitRequest::new("/no/such/roster.pdf"),
        )
        .unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.next_event(Duration::from_secs(5)) {
            events.push(event);
        }

        assert!(matches!(events.last(), Some(SplitEvent::Failed(_))));
        assert!(matches!(handle.join(), Err(SplitError::SourceNotFound(_))));
    }
}
