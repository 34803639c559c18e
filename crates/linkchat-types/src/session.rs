use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::MessageRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkChatStatus {
    Processing,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkChatMessage {
    pub id: i64,
    pub role: MessageRole,
    pub content: String,
}

/// Self-contained link-chat session kept in the durable local cache.
///
/// A degenerate project+chat pair used when no backend project exists yet;
/// reconciled against the server's job list by id once both are present.
/// CamelCase field names match the persisted wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkChatSession {
    pub id: String,
    pub url: String,
    pub title: String,
    pub created_at: i64,
    pub status: LinkChatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_started_at: Option<i64>,
    #[serde(default)]
    pub messages: Vec<LinkChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Unique local job id for a session created before the server knows it.
pub fn make_job_id() -> String {
    format!("job_{}", Uuid::new_v4().simple())
}

/// Prefix `https://` when the scheme is missing; empty input stays empty.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Hostname without a leading `www.`, or a generic fallback.
pub fn url_to_title(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("");
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        "Link chat".to_string()
    } else {
        host.to_string()
    }
}
