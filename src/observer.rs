//! Progress and diagnostic reporting
//!
//! Every QC operation takes a `&dyn QcObserver` and reports what it is doing
//! through it. Results never depend on which observer is passed in.

use std::path::Path;

/// Emit a progress event every this many records
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Something a QC operation wants its caller to know about
#[derive(Debug, Clone, PartialEq)]
pub enum QcEvent<'a> {
    Started {
        operation: &'static str,
        path: &'a Path,
    },
    Progress {
        operation: &'static str,
        records: u64,
    },
    Finished {
        operation: &'static str,
        path: &'a Path,
        details: String,
    },
    Warning {
        message: String,
    },
    /// A batch member failed and was left out of the batch
    Skipped {
        path: &'a Path,
        reason: String,
    },
}

pub trait QcObserver {
    fn on_event(&self, event: &QcEvent<'_>);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl QcObserver for NoopObserver {
    fn on_event(&self, _event: &QcEvent<'_>) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl QcObserver for TracingObserver {
    fn on_event(&self, event: &QcEvent<'_>) {
        match event {
            QcEvent::Started { operation, path } => {
                tracing::debug!(operation, path = %path.display(), "started");
            }
            QcEvent::Progress { operation, records } => {
                tracing::info!(operation, records, "processed {} records", records);
            }
            QcEvent::Finished {
                operation,
                path,
                details,
            } => {
                tracing::info!(operation, path = %path.display(), "{}", details);
            }
            QcEvent::Warning { message } => tracing::warn!("{}", message),
            QcEvent::Skipped { path, reason } => {
                tracing::warn!(path = %path.display(), "skipping file: {}", reason);
            }
        }
    }
}

/// Report progress for the first record and every `PROGRESS_INTERVAL` after
pub(crate) fn report_progress(observer: &dyn QcObserver, operation: &'static str, records: u64) {
    if records % PROGRESS_INTERVAL == 1 {
        observer.on_event(&QcEvent::Progress { operation, records });
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps a rendered copy of every event for assertions
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl QcObserver for RecordingObserver {
        fn on_event(&self, event: &QcEvent<'_>) {
            self.events.lock().unwrap().push(format!("{:?}", event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingObserver;
    use super::*;

    #[test]
    fn test_progress_reported_on_first_record_and_interval() {
        let observer = RecordingObserver::default();
        for records in 1..=(PROGRESS_INTERVAL + 1) {
            report_progress(&observer, "gc_content", records);
        }
        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].contains("records: 1 "));
    }
}
