// SPDX-License-Identifier: MIT
//
// Blob store abstraction. The pipeline only ever talks to this trait;
// production uses the S3 backend, tests and local development use the
// in-memory one.

use std::time::Duration;

use async_trait::async_trait;
use notendruck_core::error::Result;

/// Key-addressed blob storage.
///
/// Implementations must treat `put` as an idempotent overwrite
/// (last-writer-wins); the pipeline regenerates printables in place.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. `Ok(None)` means the key does not exist — callers
    /// decide whether that is an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store an object, overwriting any existing value.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Check existence without downloading content.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Server-side copy from one key to another.
    async fn copy(&self, from: &str, to: &str) -> Result<()>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Produce a time-limited URL granting read access to an object.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String>;
}
