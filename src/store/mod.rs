//! Object storage abstraction.
//!
//! The gallery coordinator and the serving route talk to binary storage
//! through the [`ObjectStore`] trait. Two backends are provided: a flat
//! directory on the local filesystem ([`fs::FsObjectStore`], the default)
//! and an S3-compatible bucket ([`s3::S3ObjectStore`]).

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

pub mod fs;
pub mod s3;

pub use fs::FsObjectStore;
pub use s3::S3ObjectStore;

/// A streamed object body.
pub type ObjectStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Result of a successful put operation.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    /// Backend-reported location of the stored object (file path or URL).
    pub location: String,
}

/// Errors surfaced by object store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object exists under the given key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The key cannot be represented by this backend.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage backend reported an error.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key-addressed binary blob storage.
///
/// Implementations are long-lived, created once at startup, and shared
/// across requests behind an `Arc`; all methods take `&self` and must be
/// safe for concurrent use.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, overwriting any existing object.
    async fn put(&self, key: &str, data: Bytes) -> Result<PutOutcome, StoreError>;

    /// Open the object under `key` as a byte stream.
    async fn get(&self, key: &str) -> Result<ObjectStream, StoreError>;

    /// Delete the object under `key`. Deleting an absent object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
