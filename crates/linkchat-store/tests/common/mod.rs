#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream;
use linkchat_api::{ChatsClient, MessageEventStream, ProjectEventStream, ProjectsClient};
use linkchat_types::{
    ChatSummary, CreateChatResponse, CreateProjectResponse, Message, MessageStreamEvent, Project,
    ProjectEvent, UpdateTitleResponse,
};

pub fn temp_cache_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("linkchat-store-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn completed_project(id: &str) -> Project {
    let mut project = Project::pending(id, "Example Report", "https://example.com/report", "Example Corp");
    project.set_status(linkchat_types::ProjectStatus::Completed);
    project
}

/// In-memory stand-in for the projects side of the gateway.
#[derive(Default)]
pub struct MockProjectsClient {
    pub fail_listing: bool,
    pub fail_events: bool,
    pub projects: Mutex<Vec<Project>>,
    pub events: Mutex<Vec<ProjectEvent>>,
    pub create_calls: AtomicUsize,
}

#[async_trait]
impl ProjectsClient for MockProjectsClient {
    async fn create_project(&self, _url: &str, name: Option<&str>) -> Result<CreateProjectResponse> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreateProjectResponse {
            project_id: "proj-1".to_string(),
            name: name.unwrap_or("Example Report").to_string(),
            company_name: "Example Corp".to_string(),
            message: "Ingestion started".to_string(),
        })
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("project not found"))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        if self.fail_listing {
            anyhow::bail!("service unavailable");
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn project_events(&self, _project_id: &str) -> Result<ProjectEventStream> {
        if self.fail_events {
            anyhow::bail!("connection refused");
        }
        let events: Vec<ProjectEvent> = self.events.lock().unwrap().clone();
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}

/// In-memory stand-in for the chats side of the gateway.
#[derive(Default)]
pub struct MockChatsClient {
    pub fail_create_chat: bool,
    pub chats: Mutex<Vec<ChatSummary>>,
    pub messages: Mutex<Vec<Message>>,
    pub stream_events: Mutex<Vec<MessageStreamEvent>>,
    pub stream_calls: AtomicUsize,
    pub message_fetches: AtomicUsize,
}

#[async_trait]
impl ChatsClient for MockChatsClient {
    async fn create_chat(&self, _project_id: &str, title: Option<&str>) -> Result<CreateChatResponse> {
        if self.fail_create_chat {
            anyhow::bail!("chat creation rejected");
        }
        Ok(CreateChatResponse {
            chat_id: "chat-1".to_string(),
            title: title.map(str::to_string),
        })
    }

    async fn list_chats(&self, _project_id: &str) -> Result<Vec<ChatSummary>> {
        Ok(self.chats.lock().unwrap().clone())
    }

    async fn chat_messages(&self, _project_id: &str, _chat_id: &str) -> Result<Vec<Message>> {
        self.message_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn update_chat_title(
        &self,
        _project_id: &str,
        _chat_id: &str,
        title: &str,
    ) -> Result<UpdateTitleResponse> {
        Ok(UpdateTitleResponse {
            success: true,
            title: title.to_string(),
        })
    }

    async fn stream_message(
        &self,
        _project_id: &str,
        _chat_id: &str,
        _message: &str,
    ) -> Result<MessageEventStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let events: Vec<MessageStreamEvent> = self.stream_events.lock().unwrap().clone();
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}
