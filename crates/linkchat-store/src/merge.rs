//! Reconciliation between locally held state and server results.
//!
//! Precedence is explicit per field rather than wholesale overwrite:
//!
//! | field                    | winner |
//! |--------------------------|--------|
//! | chat title / timestamps  | server |
//! | chat messages            | local  |
//! | chat `is_streaming`      | local  |
//! | session status / company / error | server |
//! | session messages / title / createdAt | local |

use linkchat_types::{
    Chat, ChatSummary, LinkChatSession, LinkChatStatus, Project,
};

/// Fold a server chat row into a local chat with the same id.
pub fn merge_chat(local: &Chat, remote: &ChatSummary) -> Chat {
    Chat {
        id: remote.id.clone(),
        project_id: local.project_id.clone(),
        title: remote.title.clone(),
        created_at: remote.created_at,
        updated_at: remote.updated_at,
        messages: local.messages.clone(),
        is_streaming: local.is_streaming,
    }
}

/// Merge a fetched chat list into the existing one.
///
/// Chats only known locally (created but not yet visible server-side) are
/// kept at the front; server rows matched by id keep their local messages.
pub fn merge_chat_lists(
    project_id: &str,
    existing: &[Chat],
    remote: Vec<ChatSummary>,
) -> Vec<Chat> {
    let mut merged: Vec<Chat> = existing
        .iter()
        .filter(|chat| !remote.iter().any(|summary| summary.id == chat.id))
        .cloned()
        .collect();

    for summary in remote {
        match existing.iter().find(|chat| chat.id == summary.id) {
            Some(local) => merged.push(merge_chat(local, &summary)),
            None => merged.push(Chat::from_summary(project_id, summary)),
        }
    }

    merged
}

/// Reconcile a cached legacy session against the server's job row.
///
/// API fields win on conflict; messages typed locally are never dropped.
pub fn merge_session(local: &LinkChatSession, job: &Project) -> LinkChatSession {
    LinkChatSession {
        id: local.id.clone(),
        url: if job.url.is_empty() {
            local.url.clone()
        } else {
            job.url.clone()
        },
        title: local.title.clone(),
        created_at: local.created_at,
        status: if job.status.is_terminal() {
            LinkChatStatus::Ready
        } else {
            LinkChatStatus::Processing
        },
        processing_started_at: local.processing_started_at,
        messages: local.messages.clone(),
        session_id: local.session_id.clone(),
        error_message: job
            .error_message
            .clone()
            .or_else(|| local.error_message.clone()),
        company_name: if job.company_name.is_empty() {
            local.company_name.clone()
        } else {
            Some(job.company_name.clone())
        },
    }
}
