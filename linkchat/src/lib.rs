//! # Linkchat - Document-Link Chat Synchronization Engine
//!
//! Linkchat keeps a local view of document ingestion jobs and their chats in
//! sync with a remote gateway:
//! - 🚀 **Real-time streaming** (token-by-token replies over a chunked body)
//! - 📡 **Push status updates** (one SSE connection per ingestion job)
//! - ✉️ **Pending-message recovery** (a message typed before its chat exists
//!   is delivered at most once, surviving restarts)
//! - 💾 **Durable session cache** (legacy link-chat sessions in one JSON file)
//! - ⚡ **Async/await** (built on Tokio)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Engine against the gateway (LINKCHAT_API_URL or localhost:3001)
//!     let engine = SyncEngine::builder().build()?;
//!
//!     // Submit a document link; the project appears immediately as pending
//!     let project = engine
//!         .start_project("example.com/annual-report", None)
//!         .await?;
//!
//!     // Create a chat carrying the user's first message
//!     let chat = engine
//!         .open_chat_with_message(&project.id, "What was revenue?")
//!         .await?;
//!
//!     // Navigating to the chat redeems the pending message
//!     engine.activate(&project.id, Some(&chat.id)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Linkchat consists of several composable crates:
//!
//! - **linkchat-types**: Core types (Project, Chat, push and stream events)
//! - **linkchat-api**: Gateway client (REST + chunked/SSE stream readers)
//! - **linkchat-store**: Registries, pending-action recovery, session cache
//!
//! ## Examples
//!
//! ### Watching an Ingestion Job
//!
//! ```rust,no_run
//! use linkchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = SyncEngine::builder().build()?;
//!     let project = engine
//!         .start_project("https://example.com/report", None)
//!         .await?;
//!
//!     // The subscription folds every event into the registry before
//!     // forwarding it, and closes itself on completion or failure.
//!     let subscription = engine.projects().subscribe(&project.id, |event| {
//!         println!("{event:?}");
//!     });
//!
//!     // ... later, or let a terminal event close it
//!     subscription.unsubscribe();
//!     Ok(())
//! }
//! ```
//!
//! ### Sending a Message
//!
//! ```rust,no_run
//! use linkchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = SyncEngine::builder()
//!         .base_url("http://localhost:3001")
//!         .build()?;
//!
//!     // Streams the assistant reply into the chat registry; the chat's
//!     // is_streaming flag is set while chunks arrive.
//!     engine.chats().send_message("p1", "c1", "What was revenue?").await?;
//!
//!     let chat = engine.chats().get("p1", "c1");
//!     println!("{:?}", chat.map(|c| c.messages));
//!     Ok(())
//! }
//! ```

// Re-export all public APIs
pub use linkchat_api as api;
pub use linkchat_store as store;
pub use linkchat_types as types;

// Re-export commonly used types
pub use linkchat_api::{ApiClient, ApiConfig, ChatsClient, GatewayClient, ProjectsClient};
pub use linkchat_store::{
    ChatRegistry, EventSubscription, PendingIntent, ProjectRegistry, SessionCache, StoreError,
    SyncEngine, SyncEngineBuilder,
};
pub use linkchat_types::{
    Chat, ChatSummary, Message, MessageRole, MessageStreamEvent, Project, ProjectEvent,
    ProjectStatus,
};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::api::{ApiClient, ApiConfig};
    pub use crate::store::{StoreError, SyncEngine, SyncEngineBuilder};
    pub use crate::types::{
        Chat, Message, MessageStreamEvent, Project, ProjectEvent, ProjectStatus,
    };
    pub use anyhow::Result;
}
