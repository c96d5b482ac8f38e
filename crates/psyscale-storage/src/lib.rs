//! psyscale-storage
//!
//! Object storage for JSON records. An [`ObjectStore`] is either S3 or an
//! in-process map; [`records`] layers typed load/save on top of it.

pub mod error;
pub mod memory;
pub mod records;
pub mod s3;

use async_trait::async_trait;

use error::StorageError;

pub use memory::MemoryStore;
pub use s3::S3Store;

/// Flat key/value blob store. Keys are `/`-separated paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's bytes. Missing keys yield [`StorageError::NotFound`].
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Keys under `prefix`, in lexical order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
