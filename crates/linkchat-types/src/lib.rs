pub mod chat;
pub mod events;
pub mod project;
pub mod session;

pub use chat::{Chat, ChatSummary, CreateChatResponse, Message, MessageRole, UpdateTitleResponse};
pub use events::{MessageStreamEvent, ProjectEvent};
pub use project::{CreateProjectResponse, Project, ProjectStatus};
pub use session::{
    make_job_id, normalize_url, url_to_title, LinkChatMessage, LinkChatSession, LinkChatStatus,
};
