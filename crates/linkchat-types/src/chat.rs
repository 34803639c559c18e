use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One chat message. Ids are either server-assigned or client-generated with
/// a reserved prefix (`user-<millis>` / `assistant-<millis>`) so an
/// optimistic message is addressable before the server knows about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Optimistic user message, appended before the send resolves.
    pub fn client_user(content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("user-{}", now.timestamp_millis()),
            role: MessageRole::User,
            content: content.into(),
            created_at: now,
        }
    }

    /// Empty assistant placeholder that streamed chunks get appended to.
    pub fn client_assistant() -> Self {
        let now = Utc::now();
        Self {
            id: format!("assistant-{}", now.timestamp_millis()),
            role: MessageRole::Assistant,
            content: String::new(),
            created_at: now,
        }
    }
}

/// The server's chat row: everything but the message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A chat with its locally held message list.
///
/// `is_streaming == true` means exactly one trailing assistant message is
/// still being appended to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub is_streaming: bool,
}

impl Chat {
    /// Empty chat inserted optimistically after a create call.
    pub fn new(project_id: impl Into<String>, id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            project_id: project_id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            is_streaming: false,
        }
    }

    pub fn from_summary(project_id: &str, summary: ChatSummary) -> Self {
        Self {
            id: summary.id,
            project_id: project_id.to_string(),
            title: summary.title,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            messages: Vec::new(),
            is_streaming: false,
        }
    }
}

/// Response of `POST /api/projects/{id}/chats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatResponse {
    pub chat_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Response of `PATCH /api/projects/{id}/chats/{chatId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTitleResponse {
    pub success: bool,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ids_carry_reserved_prefixes() {
        let user = Message::client_user("hello");
        assert!(user.id.starts_with("user-"));
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "hello");

        let assistant = Message::client_assistant();
        assert!(assistant.id.starts_with("assistant-"));
        assert_eq!(assistant.role, MessageRole::Assistant);
        assert!(assistant.content.is_empty());
    }

    #[test]
    fn chat_from_summary_starts_empty() {
        let summary = ChatSummary {
            id: "c1".to_string(),
            title: "Quarterly numbers".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let chat = Chat::from_summary("p1", summary);
        assert_eq!(chat.project_id, "p1");
        assert!(chat.messages.is_empty());
        assert!(!chat.is_streaming);
    }

    #[test]
    fn create_chat_response_uses_camel_case() {
        let response: CreateChatResponse =
            serde_json::from_str(r#"{"chatId":"c1","title":"New Chat"}"#).unwrap();
        assert_eq!(response.chat_id, "c1");
        assert_eq!(response.title.as_deref(), Some("New Chat"));
    }
}
