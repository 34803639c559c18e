use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("API error: {0}")]
    Api(#[from] anyhow::Error),

    #[error("Cache I/O error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
