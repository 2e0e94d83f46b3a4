use thiserror::Error;

/// Errors that can occur while talking to the image store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No stored image matches the requested content hash.
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("image store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The provided content hash is not a valid SHA-256 hex string.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    /// The uploaded image exceeds the configured size limit.
    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
