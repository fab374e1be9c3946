use thiserror::Error;

/// Errors raised by an [`AssetHost`](super::AssetHost).
#[derive(Debug, Error)]
pub enum AssetError {
    /// The identifier is empty or would escape the storage namespace.
    #[error("invalid asset identifier: {0}")]
    InvalidIdentifier(String),
    /// The upload exceeds the configured size limit.
    #[error("asset exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The upload is not an accepted image type.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    /// An I/O error occurred.
    #[error("asset IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The remote host rejected or failed the request.
    #[error("remote asset host error: {0}")]
    Remote(String),
}
