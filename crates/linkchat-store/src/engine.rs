use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use linkchat_api::{ApiClient, ApiConfig, ChatsClient, ProjectsClient};
use linkchat_types::{normalize_url, Chat, Project};

use crate::cache::{default_data_dir, SessionCache};
use crate::chats::ChatRegistry;
use crate::error::{Result, StoreError};
use crate::pending::PendingIntent;
use crate::projects::ProjectRegistry;

/// One bounded retry before a pending message is given up.
const PENDING_RETRY_DELAY: Duration = Duration::from_millis(300);

/// The synchronization engine: registries, pending-intent recovery and the
/// durable session cache, constructed once at application start and shared
/// by reference (no ambient globals).
pub struct SyncEngine {
    projects: Arc<ProjectRegistry>,
    chats: Arc<ChatRegistry>,
    pending: PendingIntent,
    cache: SessionCache,
}

impl SyncEngine {
    pub fn builder() -> SyncEngineBuilder {
        SyncEngineBuilder::new()
    }

    pub fn projects(&self) -> &Arc<ProjectRegistry> {
        &self.projects
    }

    pub fn chats(&self) -> &Arc<ChatRegistry> {
        &self.chats
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.cache
    }

    pub fn pending(&self) -> &PendingIntent {
        &self.pending
    }

    /// Validate and submit a document link. Validation happens before any
    /// network call; the returned project is already in the registry with
    /// `status = pending`.
    pub async fn start_project(&self, raw_url: &str, name: Option<&str>) -> Result<Project> {
        let url = normalize_url(raw_url);
        if url.is_empty() {
            return Err(StoreError::InvalidUrl(
                "Please paste a valid link to continue.".to_string(),
            ));
        }
        self.projects.create(&url, name).await
    }

    /// Create a chat whose first message the user already typed.
    ///
    /// The intent is armed (in memory and durably) *before* the creation
    /// request goes out, so a navigation landing before the chat row exists
    /// anywhere can still redeem it. The chat title is the message's first
    /// 50 characters. A failed creation abandons the intent.
    pub async fn open_chat_with_message(&self, project_id: &str, message: &str) -> Result<Chat> {
        if self.projects.get(project_id).is_none() {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }
        self.pending.arm(message)?;

        let title: String = message.chars().take(50).collect();
        match self.chats.create_chat(project_id, Some(&title)).await {
            Ok(chat) => Ok(chat),
            Err(e) => {
                self.pending.abandon();
                Err(e)
            }
        }
    }

    /// Navigation hook: call whenever the active project/chat pair changes.
    ///
    /// Loads the project's chat list when none is held, then either redeems
    /// a pending message against the target chat or runs the guarded
    /// history fetch. Fetch failures degrade gracefully (logged, prior state
    /// kept).
    pub async fn activate(&self, project_id: &str, chat_id: Option<&str>) -> Result<()> {
        if self.chats.list_for_project(project_id).is_empty() {
            if let Err(e) = self.chats.fetch_chats(project_id).await {
                tracing::error!("Failed to fetch chats for {}: {}", project_id, e);
            }
        }

        let Some(chat_id) = chat_id else {
            return Ok(());
        };

        if self.pending.is_armed() {
            return self.redeem_pending(project_id, chat_id).await;
        }

        if let Err(e) = self.chats.fetch_messages(project_id, chat_id).await {
            tracing::error!("Failed to fetch messages for chat {}: {}", chat_id, e);
        }
        Ok(())
    }

    /// Deliver the pending message to the target chat at most once.
    ///
    /// When the chat is not yet visible (the creation call may still be
    /// propagating into the registry), wait once for a fixed delay and
    /// re-read everything; if the chat still is not there, the intent is
    /// dropped silently and the user has to retype the message.
    async fn redeem_pending(&self, project_id: &str, chat_id: &str) -> Result<()> {
        if self.chats.get(project_id, chat_id).is_none() {
            tokio::time::sleep(PENDING_RETRY_DELAY).await;
            if self.chats.get(project_id, chat_id).is_none() {
                tracing::warn!("Pending message dropped: chat {} never appeared", chat_id);
                self.pending.abandon();
                return Ok(());
            }
        }

        // Claim the intent before the asynchronous send; a concurrent
        // attempt re-reading the slots must find them empty.
        let Some(text) = self.pending.take() else {
            return Ok(());
        };

        // The optimistic send below must not be clobbered by a history fetch.
        self.chats.mark_fetched(project_id, chat_id);
        self.chats.send_message(project_id, chat_id, &text).await
    }
}

/// Builder wiring the engine's collaborators; tests inject mock clients and
/// a scratch cache directory.
pub struct SyncEngineBuilder {
    config: Option<ApiConfig>,
    projects_client: Option<Arc<dyn ProjectsClient>>,
    chats_client: Option<Arc<dyn ChatsClient>>,
    cache_dir: Option<PathBuf>,
}

impl SyncEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            projects_client: None,
            chats_client: None,
            cache_dir: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config = Some(ApiConfig::new(url));
        self
    }

    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn projects_client(mut self, client: Arc<dyn ProjectsClient>) -> Self {
        self.projects_client = Some(client);
        self
    }

    pub fn chats_client(mut self, client: Arc<dyn ChatsClient>) -> Self {
        self.chats_client = Some(client);
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<SyncEngine> {
        let (projects_client, chats_client) = match (self.projects_client, self.chats_client) {
            (Some(projects), Some(chats)) => (projects, chats),
            (projects, chats) => {
                let config = self.config.unwrap_or_else(ApiConfig::from_env);
                let api = Arc::new(ApiClient::new(config)?);
                (
                    projects.unwrap_or_else(|| Arc::clone(&api) as Arc<dyn ProjectsClient>),
                    chats.unwrap_or_else(|| api as Arc<dyn ChatsClient>),
                )
            }
        };

        let cache_dir = match self.cache_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        let projects = Arc::new(ProjectRegistry::new(projects_client));
        let chats = Arc::new(ChatRegistry::new(chats_client, Arc::clone(&projects)));

        Ok(SyncEngine {
            projects,
            chats,
            pending: PendingIntent::new(&cache_dir),
            cache: SessionCache::new(&cache_dir),
        })
    }
}

impl Default for SyncEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
