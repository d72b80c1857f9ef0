use crate::types::{LogLevel, SplitEvent};
use std::sync::mpsc::Sender;

/// Receiver side of the progress/log stream.
///
/// Events are emitted in page-processing order. Implementations must not
/// reorder them.
pub trait EventSink {
    fn emit(&mut self, event: SplitEvent);

    fn log(&mut self, level: LogLevel, message: String) {
        self.emit(SplitEvent::Log { level, message });
    }

    fn debug(&mut self, message: String) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&mut self, message: String) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&mut self, message: String) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&mut self, message: String) {
        self.log(LogLevel::Error, message);
    }

    fn progress(&mut self, processed: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (processed.min(total) * 100 / total) as u8
        };
        self.emit(SplitEvent::Progress(percent));
    }
}

/// Collects events in memory (tests, synchronous callers)
impl EventSink for Vec<SplitEvent> {
    fn emit(&mut self, event: SplitEvent) {
        self.push(event);
    }
}

/// Channel to a polling caller. A caller that stopped listening does not stop
/// the run.
impl EventSink for Sender<SplitEvent> {
    fn emit(&mut self, event: SplitEvent) {
        if self.send(event).is_err() {
            tracing::trace!("Event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let mut events: Vec<SplitEvent> = Vec::new();
        events.progress(1, 3);
        events.progress(3, 3);
        events.progress(0, 0);
        assert_eq!(
            events,
            vec![
                SplitEvent::Progress(33),
                SplitEvent::Progress(100),
                SplitEvent::Progress(100)
            ]
        );
    }

    #[test]
    fn test_send_to_dropped_receiver_is_ignored() {
        let (mut tx, rx) = std::sync::mpsc::channel::<SplitEvent>();
        drop(rx);
        tx.info("still running".to_string());
    }
}
