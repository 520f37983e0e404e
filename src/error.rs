use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Malformed tree: {}", .0.join("; "))]
    MalformedTree(Vec<String>),

    #[error("Player index {index} out of range (0..{players})")]
    PlayerIndexOutOfRange { index: usize, players: usize },

    #[error("Cycle detected at node: {0}")]
    CycleDetected(String),

    #[error("Payload not found: {0}")]
    PayloadNotFound(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type ViewerResult<T> = Result<T, ViewerError>;
