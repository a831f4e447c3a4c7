//! Object storage boundary: fetching uploaded import files.

pub mod in_memory;
pub mod s3;

use thiserror::Error;

pub use in_memory::InMemoryObjectSource;
pub use s3::S3ObjectSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("object storage unavailable: {0}")]
    Unavailable(String),

    #[error("object {key} is not valid UTF-8")]
    Encoding { key: String },
}

/// Read access to object storage.
#[async_trait::async_trait]
pub trait ObjectSource: Send + Sync {
    /// Full content of `bucket/key` as UTF-8 text.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<String, FetchError>;
}
