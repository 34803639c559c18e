use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use linkchat_types::{LinkChatSession, Project};

use crate::error::Result;
use crate::merge::merge_session;

const SESSIONS_FILE: &str = "link_chats_v1.json";

/// Durable cache of legacy link-chat sessions.
///
/// One namespaced JSON file holding the whole session list. Read at process
/// start (and by the legacy merge path), written after every mutation that
/// must survive a restart. It is never re-read mid-session, so it cannot
/// overwrite fresher in-memory state.
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSIONS_FILE),
        }
    }

    /// Cache under the platform data directory (`<data_dir>/linkchat`).
    pub fn open_default() -> Result<Self> {
        let dir = default_data_dir()?;
        Ok(Self::new(dir))
    }

    /// A missing or corrupt file degrades to an empty list; the cache is a
    /// convenience snapshot, not a source of truth.
    pub fn load(&self) -> Vec<LinkChatSession> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt session cache: {}", e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    pub fn save(&self, sessions: &[LinkChatSession]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(sessions)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Insert or replace by id; new sessions go to the front.
    pub fn upsert(&self, session: LinkChatSession) -> Result<Vec<LinkChatSession>> {
        let mut sessions = self.load();
        match sessions.iter().position(|s| s.id == session.id) {
            Some(idx) => sessions[idx] = session,
            None => sessions.insert(0, session),
        }
        self.save(&sessions)?;
        Ok(sessions)
    }

    /// Apply a mutation to one session; unknown ids leave the file untouched.
    pub fn update<F>(&self, id: &str, f: F) -> Result<Vec<LinkChatSession>>
    where
        F: FnOnce(&mut LinkChatSession),
    {
        let mut sessions = self.load();
        if let Some(session) = sessions.iter_mut().find(|s| s.id == id) {
            f(session);
            self.save(&sessions)?;
        }
        Ok(sessions)
    }

    /// Reconcile cached sessions against the server's job list, matching by
    /// id. API fields win on conflict; local messages are preserved.
    pub fn merge_with_projects(&self, projects: &[Project]) -> Result<Vec<LinkChatSession>> {
        let sessions: Vec<LinkChatSession> = self
            .load()
            .into_iter()
            .map(|session| match projects.iter().find(|p| p.id == session.id) {
                Some(job) => merge_session(&session, job),
                None => session,
            })
            .collect();
        self.save(&sessions)?;
        Ok(sessions)
    }
}

pub(crate) fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("linkchat"))
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no platform data directory").into()
        })
}
