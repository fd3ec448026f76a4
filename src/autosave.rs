use std::time::{Duration, Instant};

/// Quiet period after the last notebook edit before the draft is written
/// through to storage.
pub const NOTEBOOK_FLUSH_AFTER: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
struct PendingDraft {
    experiment_id: String,
    content: String,
    due: Instant,
}

/// Debounced save for the rich-text notebook. At most one draft is pending
/// at a time: scheduling replaces the previous draft and restarts the quiet
/// period, so only the newest content ever reaches storage.
#[derive(Debug, Default)]
pub struct NotebookAutosave {
    pending: Option<PendingDraft>,
}

impl NotebookAutosave {
    pub fn schedule(&mut self, experiment_id: &str, content: &str, now: Instant) {
        self.pending = Some(PendingDraft {
            experiment_id: experiment_id.to_string(),
            content: content.to_string(),
            due: now + NOTEBOOK_FLUSH_AFTER,
        });
    }

    /// Removes and returns the pending draft if its quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<(String, String)> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            return self.take_now();
        }
        None
    }

    /// Removes and returns the pending draft regardless of its deadline.
    /// Used by explicit saves, which supersede the debounce.
    pub fn take_now(&mut self) -> Option<(String, String)> {
        self.pending.take().map(|p| (p.experiment_id, p.content))
    }

    /// Discards the pending draft without writing it. Called on notebook
    /// close and session teardown so stale content is never persisted.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_flushes_only_after_quiet_period() {
        let mut autosave = NotebookAutosave::default();
        let t0 = Instant::now();
        autosave.schedule("e1", "hello", t0);

        assert!(autosave.take_due(t0).is_none());
        assert!(autosave
            .take_due(t0 + NOTEBOOK_FLUSH_AFTER / 2)
            .is_none());

        let flushed = autosave.take_due(t0 + NOTEBOOK_FLUSH_AFTER);
        assert_eq!(flushed, Some(("e1".to_string(), "hello".to_string())));
        assert!(!autosave.is_pending());
    }

    #[test]
    fn newer_draft_replaces_pending_and_restarts_clock() {
        let mut autosave = NotebookAutosave::default();
        let t0 = Instant::now();
        autosave.schedule("e1", "first", t0);

        let t1 = t0 + NOTEBOOK_FLUSH_AFTER / 2;
        autosave.schedule("e1", "second", t1);

        // The first deadline has passed but the draft was superseded.
        assert!(autosave.take_due(t0 + NOTEBOOK_FLUSH_AFTER).is_none());

        let flushed = autosave.take_due(t1 + NOTEBOOK_FLUSH_AFTER);
        assert_eq!(flushed, Some(("e1".to_string(), "second".to_string())));
    }

    #[test]
    fn cancel_discards_pending_draft() {
        let mut autosave = NotebookAutosave::default();
        let t0 = Instant::now();
        autosave.schedule("e1", "draft", t0);
        autosave.cancel();
        assert!(autosave.take_due(t0 + NOTEBOOK_FLUSH_AFTER * 2).is_none());
    }
}
