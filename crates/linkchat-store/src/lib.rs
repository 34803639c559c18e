pub mod cache;
pub mod chats;
pub mod engine;
pub mod error;
pub mod merge;
pub mod pending;
pub mod projects;
pub mod subscription;

pub use cache::SessionCache;
pub use chats::ChatRegistry;
pub use engine::{SyncEngine, SyncEngineBuilder};
pub use error::{Result, StoreError};
pub use merge::{merge_chat, merge_chat_lists, merge_session};
pub use pending::PendingIntent;
pub use projects::ProjectRegistry;
pub use subscription::EventSubscription;
