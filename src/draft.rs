//! Debounced draft persistence.
//!
//! Every keystroke in the popup triggers an update, but only the last
//! value in a burst is written: the background loop keeps consuming
//! triggers until the quiescence window passes with no new input, then
//! persists whatever arrived last.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

/// How long input must stay quiet before the pending draft is written.
pub const DRAFT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Where a debounced draft write lands. Split out as a trait so the
/// debounce loop can be exercised without a real store behind it.
pub trait DraftSink: Send + Sync + 'static {
    fn persist_draft(&self, text: &str) -> anyhow::Result<()>;
}

impl DraftSink for crate::notes::NoteStore {
    fn persist_draft(&self, text: &str) -> anyhow::Result<()> {
        self.save_draft(text)
    }
}

/// Coalesces rapid draft updates into a single store write per burst.
///
/// Spawns a background tokio task that lives until the debouncer is
/// dropped, so it must be created from within a runtime.
pub struct DraftDebouncer {
    tx: mpsc::Sender<String>,
}

impl DraftDebouncer {
    pub fn new(sink: Arc<dyn DraftSink>, quiescence: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<String>(64);
        tokio::spawn(Self::run_loop(sink, rx, quiescence));
        Self { tx }
    }

    /// Record the latest draft text. Non-blocking: returns immediately.
    /// If the channel is somehow full the trigger is dropped; the write
    /// already pending will still fire.
    pub fn update(&self, text: String) {
        let _ = self.tx.try_send(text);
    }

    async fn run_loop(
        sink: Arc<dyn DraftSink>,
        mut rx: mpsc::Receiver<String>,
        quiescence: Duration,
    ) {
        loop {
            // Wait for the first edit of a burst.
            let mut latest = match rx.recv().await {
                Some(text) => text,
                None => break, // channel closed, debouncer dropped
            };

            // Keep replacing the pending value until input goes quiet.
            loop {
                match tokio::time::timeout(quiescence, rx.recv()).await {
                    Ok(Some(text)) => latest = text,
                    Ok(None) => return,
                    Err(_) => break, // quiescence window elapsed
                }
            }

            if let Err(e) = sink.persist_draft(&latest) {
                tracing::warn!("Draft write failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct RecordingSink {
        writes: AtomicU32,
        last: Mutex<String>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                writes: AtomicU32::new(0),
                last: Mutex::new(String::new()),
            })
        }
    }

    impl DraftSink for RecordingSink {
        fn persist_draft(&self, text: &str) -> anyhow::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = text.to_string();
            Ok(())
        }
    }

    #[tokio::test]
    async fn burst_of_edits_persists_only_the_final_value() {
        let sink = RecordingSink::new();
        let debouncer = DraftDebouncer::new(sink.clone(), Duration::from_millis(100));

        for text in ["B", "Bu", "Buy", "Buy m", "Buy milk"] {
            debouncer.update(text.to_string());
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(sink.writes.load(Ordering::SeqCst), 1);
        assert_eq!(*sink.last.lock().unwrap(), "Buy milk");
    }

    #[tokio::test]
    async fn separate_bursts_produce_separate_writes() {
        let sink = RecordingSink::new();
        let debouncer = DraftDebouncer::new(sink.clone(), Duration::from_millis(50));

        debouncer.update("first".to_string());
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.update("second".to_string());
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(sink.writes.load(Ordering::SeqCst), 2);
        assert_eq!(*sink.last.lock().unwrap(), "second");
    }

    #[tokio::test]
    async fn no_input_means_no_write() {
        let sink = RecordingSink::new();
        let _debouncer = DraftDebouncer::new(sink.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sink.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn debounced_writes_reach_the_real_store() {
        let store = crate::notes::NoteStore::new(crate::store::tests::temp_store("draft"));
        let debouncer =
            DraftDebouncer::new(Arc::new(store.clone()), Duration::from_millis(50));

        debouncer.update("in progress".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.load().unwrap().draft, "in progress");
    }
}
