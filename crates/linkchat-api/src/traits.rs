use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use linkchat_types::{
    ChatSummary, CreateChatResponse, CreateProjectResponse, Message, MessageStreamEvent, Project,
    ProjectEvent, UpdateTitleResponse,
};

/// Typed push events for one project, in server emission order.
pub type ProjectEventStream = Pin<Box<dyn Stream<Item = Result<ProjectEvent>> + Send>>;

/// Incremental tokens and the final payload of one chat reply.
pub type MessageEventStream = Pin<Box<dyn Stream<Item = Result<MessageStreamEvent>> + Send>>;

/// Project (ingestion job) operations of the gateway.
///
/// Implementations hold no domain state; they produce results and streams
/// that the registries consume.
#[async_trait]
pub trait ProjectsClient: Send + Sync {
    /// Start an ingestion job for a document link.
    async fn create_project(&self, url: &str, name: Option<&str>) -> Result<CreateProjectResponse>;

    async fn get_project(&self, project_id: &str) -> Result<Project>;

    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Open the push stream reporting the job's stage transitions.
    async fn project_events(&self, project_id: &str) -> Result<ProjectEventStream>;
}

/// Chat operations of the gateway.
#[async_trait]
pub trait ChatsClient: Send + Sync {
    async fn create_chat(&self, project_id: &str, title: Option<&str>) -> Result<CreateChatResponse>;

    async fn list_chats(&self, project_id: &str) -> Result<Vec<ChatSummary>>;

    async fn chat_messages(&self, project_id: &str, chat_id: &str) -> Result<Vec<Message>>;

    async fn update_chat_title(
        &self,
        project_id: &str,
        chat_id: &str,
        title: &str,
    ) -> Result<UpdateTitleResponse>;

    /// Send a message and stream the assistant reply token by token.
    async fn stream_message(
        &self,
        project_id: &str,
        chat_id: &str,
        message: &str,
    ) -> Result<MessageEventStream>;
}

/// Convenience trait for clients that cover the whole gateway surface.
pub trait GatewayClient: ProjectsClient + ChatsClient {}
