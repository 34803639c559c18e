use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Response;
use serde::Deserialize;

use linkchat_types::{
    ChatSummary, CreateChatResponse, CreateProjectResponse, Message, Project, UpdateTitleResponse,
};

use crate::config::ApiConfig;
use crate::sse::parse_event_stream;
use crate::streaming::parse_message_stream;
use crate::traits::{ChatsClient, GatewayClient, MessageEventStream, ProjectEventStream, ProjectsClient};

/// Error body the ingestion service returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP gateway to the ingestion service (HTTP direct, no SDK).
///
/// Stateless by contract: every call produces a result or a stream; all
/// domain state lives in the registries that consume them.
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client configured from `LINKCHAT_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Extract the server's `{error}` detail when present, otherwise fall
    /// back to the raw body or status line.
    async fn check(response: Response, action: &'static str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        anyhow::bail!("{} failed ({}): {}", action, status, detail);
    }
}

#[async_trait]
impl ProjectsClient for ApiClient {
    async fn create_project(&self, url: &str, name: Option<&str>) -> Result<CreateProjectResponse> {
        let response = self
            .http_client
            .post(format!("{}/api/projects", self.base_url))
            .json(&serde_json::json!({ "url": url, "name": name }))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "Create project").await?;
        response.json().await.context("Failed to parse response")
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let response = self
            .http_client
            .get(format!("{}/api/projects/{}", self.base_url, project_id))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "Get project").await?;
        response.json().await.context("Failed to parse response")
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let response = self
            .http_client
            .get(format!("{}/api/projects", self.base_url))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "List projects").await?;
        response.json().await.context("Failed to parse response")
    }

    async fn project_events(&self, project_id: &str) -> Result<ProjectEventStream> {
        let response = self
            .http_client
            .get(format!("{}/api/projects/{}/events", self.base_url, project_id))
            .send()
            .await
            .context("Failed to open push stream")?;

        let response = Self::check(response, "Subscribe to project events").await?;
        Ok(parse_event_stream(response))
    }
}

#[async_trait]
impl ChatsClient for ApiClient {
    async fn create_chat(&self, project_id: &str, title: Option<&str>) -> Result<CreateChatResponse> {
        let response = self
            .http_client
            .post(format!("{}/api/projects/{}/chats", self.base_url, project_id))
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "Create chat").await?;
        response.json().await.context("Failed to parse response")
    }

    async fn list_chats(&self, project_id: &str) -> Result<Vec<ChatSummary>> {
        let response = self
            .http_client
            .get(format!("{}/api/projects/{}/chats", self.base_url, project_id))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "List chats").await?;
        response.json().await.context("Failed to parse response")
    }

    async fn chat_messages(&self, project_id: &str, chat_id: &str) -> Result<Vec<Message>> {
        let response = self
            .http_client
            .get(format!(
                "{}/api/projects/{}/chats/{}",
                self.base_url, project_id, chat_id
            ))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "Get messages").await?;
        response.json().await.context("Failed to parse response")
    }

    async fn update_chat_title(
        &self,
        project_id: &str,
        chat_id: &str,
        title: &str,
    ) -> Result<UpdateTitleResponse> {
        let response = self
            .http_client
            .patch(format!(
                "{}/api/projects/{}/chats/{}",
                self.base_url, project_id, chat_id
            ))
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "Update chat title").await?;
        response.json().await.context("Failed to parse response")
    }

    async fn stream_message(
        &self,
        project_id: &str,
        chat_id: &str,
        message: &str,
    ) -> Result<MessageEventStream> {
        let response = self
            .http_client
            .post(format!(
                "{}/api/projects/{}/chats/{}/messages",
                self.base_url, project_id, chat_id
            ))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .context("Failed to send request")?;

        let response = Self::check(response, "Send message").await?;
        Ok(parse_message_stream(response))
    }
}

impl GatewayClient for ApiClient {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:3001/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
    }
}
