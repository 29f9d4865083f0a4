use thiserror::Error;

/// Errors raised by host collaborators
#[derive(Error, Debug)]
pub enum HostError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("No active file")]
    NoActiveFile,

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type HostResult<T> = std::result::Result<T, HostError>;
