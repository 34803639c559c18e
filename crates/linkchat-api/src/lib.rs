pub mod client;
pub mod config;
pub mod sse;
pub mod streaming;
pub mod traits;

pub use client::ApiClient;
pub use config::{ApiConfig, API_URL_ENV, DEFAULT_API_BASE};
pub use sse::{parse_event_frames, parse_event_stream};
pub use streaming::{parse_message_lines, parse_message_stream};
pub use traits::{ChatsClient, GatewayClient, MessageEventStream, ProjectEventStream, ProjectsClient};
