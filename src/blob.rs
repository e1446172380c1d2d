//! Blob-store contract (spec.md §6) for venue photos. The concrete backend
//! (S3-compatible object storage) is an external collaborator, out of scope.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::TransportError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_photo(&self, key: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>, TransportError>;
}

/// A stub that always fails. The S3-compatible backend is an external
/// collaborator (spec.md §1) with no implementation in this crate; wire a
/// real one in before venue photos are needed.
pub struct UnconfiguredBlobStore;

#[async_trait]
impl BlobStore for UnconfiguredBlobStore {
    async fn get_photo(&self, key: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>, TransportError> {
        Err(TransportError::Blob(format!("blob store not configured, requested key {key}")))
    }
}
