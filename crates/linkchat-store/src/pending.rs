use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::Result;

const PENDING_FILE: &str = "pending_message.txt";

/// A message typed before its target chat exists.
///
/// The text is held in two places at once: an in-memory slot (survives a
/// live re-render) and a durable file (survives a restart). Redemption is
/// at-most-once: [`PendingIntent::take`] clears both under a single lock, so
/// whoever gets the text owns the send and every later attempt sees nothing.
///
/// One global slot; arming replaces whatever was pending before.
pub struct PendingIntent {
    slot: Mutex<Option<String>>,
    path: PathBuf,
}

impl PendingIntent {
    pub fn new(dir: &Path) -> Self {
        Self {
            slot: Mutex::new(None),
            path: dir.join(PENDING_FILE),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the text to both slots. Must complete before the chat-creation
    /// request goes out, so a navigation or reload cannot lose it.
    pub fn arm(&self, text: &str) -> Result<()> {
        let mut slot = self.lock();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        *slot = Some(text.to_string());
        Ok(())
    }

    /// Read whichever slot still holds the text. Either may have been
    /// cleared by a faster redemption path.
    pub fn peek(&self) -> Option<String> {
        let slot = self.lock();
        slot.clone().or_else(|| self.read_durable())
    }

    pub fn is_armed(&self) -> bool {
        self.peek().is_some()
    }

    /// Compare-and-clear: return the pending text and empty both slots in
    /// one critical section.
    pub fn take(&self) -> Option<String> {
        let mut slot = self.lock();
        let durable = self.read_durable();
        let _ = fs::remove_file(&self.path);
        slot.take().or(durable)
    }

    /// Drop the intent without redeeming it (chat creation failed).
    pub fn abandon(&self) {
        let mut slot = self.lock();
        *slot = None;
        let _ = fs::remove_file(&self.path);
    }

    fn read_durable(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("linkchat-pending-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn take_is_at_most_once() {
        let dir = temp_dir();
        let pending = PendingIntent::new(&dir);

        pending.arm("T").unwrap();
        assert_eq!(pending.take().as_deref(), Some("T"));
        assert_eq!(pending.take(), None);
        assert!(!pending.is_armed());
    }

    #[test]
    fn survives_a_restart_via_the_durable_slot() {
        let dir = temp_dir();
        PendingIntent::new(&dir).arm("remember me").unwrap();

        // A fresh instance has an empty in-memory slot but finds the file.
        let reloaded = PendingIntent::new(&dir);
        assert_eq!(reloaded.peek().as_deref(), Some("remember me"));
        assert_eq!(reloaded.take().as_deref(), Some("remember me"));
        assert_eq!(reloaded.take(), None);
    }

    #[test]
    fn abandon_clears_both_slots() {
        let dir = temp_dir();
        let pending = PendingIntent::new(&dir);

        pending.arm("doomed").unwrap();
        pending.abandon();
        assert_eq!(pending.peek(), None);
        assert_eq!(PendingIntent::new(&dir).peek(), None);
    }
}
