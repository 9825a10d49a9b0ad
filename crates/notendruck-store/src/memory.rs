// SPDX-License-Identifier: MIT
//
// In-memory object store for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use notendruck_core::error::{NotendruckError, Result};
use tokio::sync::RwLock;

use crate::object_store::ObjectStore;

/// `ObjectStore` backed by a `HashMap`. Last-writer-wins, like the real
/// bucket. Supports injecting transient `put` failures so retry behavior
/// can be exercised.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    put_failures: AtomicU32,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `put` fail with a store error.
    pub fn inject_put_failures(&self, count: u32) {
        self.put_failures.store(count, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Seed an object directly (test fixture helper).
    pub async fn seed(&self, key: &str, bytes: Vec<u8>) {
        self.objects.write().await.insert(key.to_string(), bytes);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        if self.put_failures.load(Ordering::SeqCst) > 0 {
            self.put_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(NotendruckError::Store(format!(
                "injected transient failure for {key}"
            )));
        }
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        let value = objects
            .get(from)
            .cloned()
            .ok_or_else(|| NotendruckError::Store(format!("copy source missing: {from}")))?;
        objects.insert(to.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String> {
        if !self.objects.read().await.contains_key(key) {
            return Err(NotendruckError::Store(format!("presign of missing key: {key}")));
        }
        Ok(format!("memory://{key}?expires={}", ttl.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = MemoryObjectStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryObjectStore::new();
        store.put("a/b", vec![1, 2, 3], "application/pdf").await.unwrap();
        assert_eq!(store.get("a/b").await.unwrap(), Some(vec![1, 2, 3]));
        assert!(store.exists("a/b").await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryObjectStore::new();
        store.put("k", vec![1], "application/pdf").await.unwrap();
        store.put("k", vec![2], "application/pdf").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(vec![2]));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let store = MemoryObjectStore::new();
        store.inject_put_failures(1);
        assert!(store.put("k", vec![1], "application/pdf").await.is_err());
        assert!(store.put("k", vec![1], "application/pdf").await.is_ok());
    }

    #[tokio::test]
    async fn copy_and_delete() {
        let store = MemoryObjectStore::new();
        store.put("src", vec![9], "application/pdf").await.unwrap();
        store.copy("src", "dst").await.unwrap();
        assert!(store.exists("dst").await.unwrap());

        store.delete("src").await.unwrap();
        assert!(!store.exists("src").await.unwrap());
        // Deleting a missing key is fine.
        store.delete("src").await.unwrap();
    }
}
