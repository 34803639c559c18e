use serde::{Deserialize, Serialize};

use crate::project::ProjectStatus;

/// Push events for a single ingestion job, delivered in server order over
/// one connection per project.
///
/// One typed enum dispatched to a single handler per connection, instead of a
/// set of independently parsed named listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectEvent {
    /// Stage transition reported by the server.
    Status {
        status: ProjectStatus,
        #[serde(default)]
        message: String,
    },

    /// Chatty telemetry; delivered but never surfaced as chat content.
    Progress { message: String },

    /// Ingestion finished. Terminal; the connection closes after this.
    Complete {
        #[serde(rename = "chunksProcessed", default)]
        chunks_processed: u64,
    },

    /// Ingestion failed. Terminal; the connection closes after this.
    Error { error: String },
}

impl ProjectEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectEvent::Complete { .. } | ProjectEvent::Error { .. })
    }
}

/// Incremental events decoded from a chat reply's chunked body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageStreamEvent {
    /// One incremental token of the assistant reply.
    Chunk { text: String },

    /// Final payload. When `response` is present it is the canonical reply
    /// text and overrides whatever chunks accumulated.
    Done {
        response: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sources: Option<serde_json::Value>,
    },
}
