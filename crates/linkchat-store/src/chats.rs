use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use futures::{Stream, StreamExt};
use linkchat_api::ChatsClient;
use linkchat_types::{Chat, Message, MessageStreamEvent, ProjectStatus};

use crate::error::{Result, StoreError};
use crate::merge::merge_chat_lists;
use crate::projects::ProjectRegistry;

type ChatsByProject = HashMap<String, Vec<Chat>>;

/// Canonical per-project table of chats and their message lists.
///
/// Mutations are short critical sections under the lock; anything decided
/// after an await (a streamed chunk, a fetched history) is applied as a
/// closure against the state current at application time, so concurrent
/// chunk deliveries never overwrite each other.
pub struct ChatRegistry {
    api: Arc<dyn ChatsClient>,
    projects: Arc<ProjectRegistry>,
    inner: RwLock<ChatsByProject>,
    /// `project:chat` pairs whose history was already loaded (or deliberately
    /// skipped after a pending-message send).
    fetched: Mutex<HashSet<String>>,
}

impl ChatRegistry {
    pub fn new(api: Arc<dyn ChatsClient>, projects: Arc<ProjectRegistry>) -> Self {
        Self {
            api,
            projects,
            inner: RwLock::new(HashMap::new()),
            fetched: Mutex::new(HashSet::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ChatsByProject> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChatsByProject> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fetch_key(project_id: &str, chat_id: &str) -> String {
        format!("{project_id}:{chat_id}")
    }

    pub fn list_for_project(&self, project_id: &str) -> Vec<Chat> {
        self.read().get(project_id).cloned().unwrap_or_default()
    }

    pub fn get(&self, project_id: &str, chat_id: &str) -> Option<Chat> {
        self.read()
            .get(project_id)
            .and_then(|chats| chats.iter().find(|c| c.id == chat_id))
            .cloned()
    }

    pub fn set_chats(&self, project_id: &str, chats: Vec<Chat>) {
        self.write().insert(project_id.to_string(), chats);
    }

    /// New chats go to the front, matching recency ordering.
    pub fn add_chat(&self, project_id: &str, chat: Chat) {
        self.write()
            .entry(project_id.to_string())
            .or_default()
            .insert(0, chat);
    }

    pub fn update_chat<F>(&self, project_id: &str, chat_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Chat),
    {
        let mut inner = self.write();
        match inner
            .get_mut(project_id)
            .and_then(|chats| chats.iter_mut().find(|c| c.id == chat_id))
        {
            Some(chat) => {
                f(chat);
                true
            }
            None => false,
        }
    }

    pub fn add_message(&self, project_id: &str, chat_id: &str, message: Message) -> bool {
        self.update_chat(project_id, chat_id, |chat| chat.messages.push(message))
    }

    pub fn update_message<F>(&self, project_id: &str, chat_id: &str, message_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Message),
    {
        let mut updated = false;
        self.update_chat(project_id, chat_id, |chat| {
            if let Some(message) = chat.messages.iter_mut().find(|m| m.id == message_id) {
                f(message);
                updated = true;
            }
        });
        updated
    }

    /// Mark a chat's history as already loaded so the normal fetch path does
    /// not run and clobber optimistic messages.
    pub fn mark_fetched(&self, project_id: &str, chat_id: &str) {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::fetch_key(project_id, chat_id));
    }

    pub fn is_fetched(&self, project_id: &str, chat_id: &str) -> bool {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&Self::fetch_key(project_id, chat_id))
    }

    /// Fetch the server's chat list and merge it into the existing one
    /// without discarding locally held messages or local-only chats.
    pub async fn fetch_chats(&self, project_id: &str) -> Result<Vec<Chat>> {
        let summaries = self.api.list_chats(project_id).await?;

        // Merge against the state current *after* the await.
        let mut inner = self.write();
        let existing = inner.entry(project_id.to_string()).or_default();
        let merged = merge_chat_lists(project_id, existing, summaries);
        *existing = merged.clone();
        Ok(merged)
    }

    /// Load a chat's history once. A no-op when the chat is not in the
    /// registry yet (a later fetch gets it after the chat list lands) or when
    /// it already holds any message: an in-flight optimistic send must not be
    /// clobbered by a slow or empty server read.
    pub async fn fetch_messages(&self, project_id: &str, chat_id: &str) -> Result<()> {
        if self.is_fetched(project_id, chat_id) {
            return Ok(());
        }
        let Some(chat) = self.get(project_id, chat_id) else {
            return Ok(());
        };
        if !chat.messages.is_empty() {
            return Ok(());
        }

        let mut messages = self.api.chat_messages(project_id, chat_id).await?;
        // Fetched history is ordered by authoritative timestamps, not ids.
        messages.sort_by_key(|m| m.created_at);

        self.update_chat(project_id, chat_id, |chat| {
            if chat.messages.is_empty() {
                chat.messages = messages;
            }
        });
        self.mark_fetched(project_id, chat_id);
        Ok(())
    }

    /// Create a chat server-side and insert an empty row optimistically.
    pub async fn create_chat(&self, project_id: &str, title: Option<&str>) -> Result<Chat> {
        let response = self.api.create_chat(project_id, title).await?;
        let title = response
            .title
            .or_else(|| title.map(str::to_string))
            .unwrap_or_else(|| "New Chat".to_string());

        let chat = Chat::new(project_id, response.chat_id, title);
        self.add_chat(project_id, chat.clone());
        Ok(chat)
    }

    pub async fn update_title(&self, project_id: &str, chat_id: &str, title: &str) -> Result<()> {
        if self.get(project_id, chat_id).is_none() {
            return Err(StoreError::ChatNotFound(chat_id.to_string()));
        }
        let response = self.api.update_chat_title(project_id, chat_id, title).await?;
        self.update_chat(project_id, chat_id, |chat| {
            chat.title = response.title;
            chat.updated_at = Utc::now();
        });
        Ok(())
    }

    /// Send a message and stream the assistant reply into the registry.
    ///
    /// Empty input, sends against a project that is not `completed` and
    /// sends while a reply is still streaming into the chat are rejected
    /// silently, without touching the registry. The optimistic user
    /// message is never retracted; failures annotate the assistant
    /// placeholder instead.
    pub async fn send_message(&self, project_id: &str, chat_id: &str, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let ready = self
            .projects
            .get(project_id)
            .map(|p| p.status == ProjectStatus::Completed)
            .unwrap_or(false);
        if !ready {
            tracing::debug!("Ignoring send on project {} that is not ready", project_id);
            return Ok(());
        }

        // At most one streaming reply per chat.
        let streaming = self
            .get(project_id, chat_id)
            .map(|c| c.is_streaming)
            .unwrap_or(false);
        if streaming {
            tracing::debug!("Ignoring send while chat {} is still streaming", chat_id);
            return Ok(());
        }

        let user_message = Message::client_user(trimmed);
        let now = user_message.created_at;
        self.add_message(project_id, chat_id, user_message);
        self.update_chat(project_id, chat_id, |chat| chat.updated_at = now);

        let placeholder = Message::client_assistant();
        let assistant_id = placeholder.id.clone();
        self.add_message(project_id, chat_id, placeholder);
        self.update_chat(project_id, chat_id, |chat| chat.is_streaming = true);

        let stream = match self.api.stream_message(project_id, chat_id, trimmed).await {
            Ok(stream) => stream,
            Err(e) => {
                self.update_message(project_id, chat_id, &assistant_id, |m| {
                    m.content = format!("Error: {e}");
                });
                self.update_chat(project_id, chat_id, |chat| chat.is_streaming = false);
                return Ok(());
            }
        };

        self.apply_message_stream(project_id, chat_id, &assistant_id, stream)
            .await;
        Ok(())
    }

    /// Reconcile one streaming reply into the placeholder message.
    ///
    /// Chunks append to the content *currently* in the registry; a final
    /// `response` replaces the accumulation verbatim (the server is
    /// authoritative over chunk delivery); stream errors annotate the
    /// placeholder. `is_streaming` is cleared on every exit path.
    pub async fn apply_message_stream<S>(
        &self,
        project_id: &str,
        chat_id: &str,
        assistant_id: &str,
        stream: S,
    ) where
        S: Stream<Item = anyhow::Result<MessageStreamEvent>> + Send,
    {
        let mut events = std::pin::pin!(stream);

        while let Some(item) = events.next().await {
            match item {
                Ok(MessageStreamEvent::Chunk { text }) => {
                    self.update_message(project_id, chat_id, assistant_id, |m| {
                        m.content.push_str(&text);
                    });
                }
                Ok(MessageStreamEvent::Done { response, .. }) => {
                    if let Some(response) = response {
                        self.update_message(project_id, chat_id, assistant_id, |m| {
                            m.content = response;
                        });
                    }
                }
                Err(e) => {
                    self.update_message(project_id, chat_id, assistant_id, |m| {
                        m.content = format!("Error: {e}");
                    });
                    self.update_chat(project_id, chat_id, |chat| chat.is_streaming = false);
                    return;
                }
            }
        }

        self.update_chat(project_id, chat_id, |chat| {
            chat.is_streaming = false;
            chat.updated_at = Utc::now();
        });
    }
}
