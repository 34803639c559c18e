use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

/// Handle to one push-stream connection.
///
/// The connection closes itself after a terminal event; `unsubscribe` is
/// idempotent and safe to call after that natural closure.
pub struct EventSubscription {
    closed: AtomicBool,
    handle: JoinHandle<()>,
}

impl EventSubscription {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self {
            closed: AtomicBool::new(false),
            handle,
        }
    }

    pub fn unsubscribe(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.handle.abort();
        }
    }

    /// True once the reader task finished, whether by terminal event,
    /// transport error or explicit unsubscribe.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.handle.is_finished()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
