// SPDX-License-Identifier: MIT
//
// Asset store facade: templates, fonts, and generated printables,
// addressed through the bucket layout in `keys`.

use std::sync::Arc;
use std::time::Duration;

use notendruck_core::error::{NotendruckError, Result};
use notendruck_core::types::TemplateType;
use tracing::{debug, info, instrument};

use crate::keys;
use crate::object_store::ObjectStore;
use crate::retry::{RetryConfig, with_retries};

/// High-level access to templates, fonts, and generated artifacts.
///
/// Explicitly constructed and passed to request handlers — there is no
/// global instance.
pub struct AssetStore {
    store: Arc<dyn ObjectStore>,
    retry: RetryConfig,
}

impl AssetStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(store: Arc<dyn ObjectStore>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    // -- Reads ----------------------------------------------------------------

    /// Fetch the base template for a product. `None` means the operator has
    /// not uploaded it yet — a recoverable per-item condition, not an error.
    pub async fn get_template(&self, template_type: TemplateType) -> Result<Option<Vec<u8>>> {
        self.store.get(&keys::template_key(template_type)).await
    }

    /// Fetch a font file. Unlike templates, a missing font is an error —
    /// callers catch it and substitute the builtin fallback font.
    pub async fn get_font(&self, family: &str) -> Result<Vec<u8>> {
        match self.store.get(&keys::font_key(family)).await? {
            Some(bytes) => Ok(bytes),
            None => Err(NotendruckError::FontUnavailable(format!(
                "{family} is not uploaded"
            ))),
        }
    }

    /// Download a previously generated printable.
    pub async fn get_generated(
        &self,
        event_id: &str,
        template_type: TemplateType,
    ) -> Result<Option<Vec<u8>>> {
        self.store.get(&keys::output_key(event_id, template_type)).await
    }

    // -- Writes ---------------------------------------------------------------

    /// Upload a generated printable, overwriting any previous version.
    ///
    /// Transient store failures are retried with exponential backoff
    /// (3 attempts, 1s/2s/4s). Returns the object key on success.
    #[instrument(skip(self, bytes), fields(template_type = %template_type, bytes = bytes.len()))]
    pub async fn upload_generated(
        &self,
        event_id: &str,
        template_type: TemplateType,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let key = keys::output_key(event_id, template_type);
        with_retries(&self.retry, "upload_generated", || {
            self.store.put(&key, bytes.clone(), keys::PDF_CONTENT_TYPE)
        })
        .await?;

        info!(key, "printable uploaded");
        Ok(key)
    }

    /// Operator provisioning: upload a blank base template.
    pub async fn upload_template(
        &self,
        template_type: TemplateType,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let key = keys::template_key(template_type);
        with_retries(&self.retry, "upload_template", || {
            self.store.put(&key, bytes.clone(), keys::PDF_CONTENT_TYPE)
        })
        .await?;
        Ok(key)
    }

    /// Operator provisioning: upload a font file.
    pub async fn upload_font(&self, family: &str, bytes: Vec<u8>) -> Result<String> {
        let key = keys::font_key(family);
        with_retries(&self.retry, "upload_font", || {
            self.store.put(&key, bytes.clone(), keys::FONT_CONTENT_TYPE)
        })
        .await?;
        Ok(key)
    }

    // -- Key management -------------------------------------------------------

    /// Time-limited read URL for browser previews. The generation path
    /// itself never goes through URLs; it reads raw bytes server-side.
    pub async fn signed_url(&self, key: &str, ttl_secs: u64) -> Result<String> {
        self.store
            .presign_get(key, Duration::from_secs(ttl_secs))
            .await
    }

    /// Server-side copy between keys.
    pub async fn copy_object(&self, from: &str, to: &str) -> Result<()> {
        self.store.copy(from, to).await
    }

    /// Relocate an object (copy, then delete the source). Used when an
    /// event is renumbered and its artifacts move to the new key prefix.
    pub async fn move_object(&self, from: &str, to: &str) -> Result<()> {
        self.store.copy(from, to).await?;
        self.store.delete(from).await?;
        debug!(from, to, "object moved");
        Ok(())
    }

    pub(crate) fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryObjectStore;
    use crate::retry::RetryConfig;

    fn assets_with(store: Arc<MemoryObjectStore>) -> AssetStore {
        // Millisecond delays keep retry tests fast.
        AssetStore::with_retry(
            store,
            RetryConfig {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
            },
        )
    }

    #[tokio::test]
    async fn missing_template_is_none_not_error() {
        let assets = assets_with(Arc::new(MemoryObjectStore::new()));
        let template = assets.get_template(TemplateType::Button).await.unwrap();
        assert!(template.is_none());
    }

    #[tokio::test]
    async fn missing_font_is_an_error() {
        let assets = assets_with(Arc::new(MemoryObjectStore::new()));
        let err = assets.get_font("Montserrat-Bold").await.unwrap_err();
        assert!(matches!(err, NotendruckError::FontUnavailable(_)));
    }

    #[tokio::test]
    async fn upload_retries_transient_failures() {
        let store = Arc::new(MemoryObjectStore::new());
        store.inject_put_failures(2);
        let assets = assets_with(Arc::clone(&store));

        let key = assets
            .upload_generated("ev1", TemplateType::Flyer1, vec![0x25, 0x50, 0x44, 0x46])
            .await
            .unwrap();
        assert_eq!(key, "events/ev1/printables/flyer1.pdf");
        assert!(store.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn upload_gives_up_after_three_attempts() {
        let store = Arc::new(MemoryObjectStore::new());
        store.inject_put_failures(3);
        let assets = assets_with(Arc::clone(&store));

        let result = assets
            .upload_generated("ev1", TemplateType::Flyer1, vec![1])
            .await;
        assert!(result.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn regeneration_overwrites_in_place() {
        let store = Arc::new(MemoryObjectStore::new());
        let assets = assets_with(Arc::clone(&store));

        assets
            .upload_generated("ev1", TemplateType::Button, vec![1])
            .await
            .unwrap();
        assets
            .upload_generated("ev1", TemplateType::Button, vec![2])
            .await
            .unwrap();

        let stored = store.get("events/ev1/printables/button.pdf").await.unwrap();
        assert_eq!(stored, Some(vec![2]));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn move_object_relocates() {
        let store = Arc::new(MemoryObjectStore::new());
        let assets = assets_with(Arc::clone(&store));
        store.seed("events/old/printables/button.pdf", vec![7]).await;

        assets
            .move_object(
                "events/old/printables/button.pdf",
                "events/new/printables/button.pdf",
            )
            .await
            .unwrap();

        assert!(!store.exists("events/old/printables/button.pdf").await.unwrap());
        assert_eq!(
            store.get("events/new/printables/button.pdf").await.unwrap(),
            Some(vec![7])
        );
    }
}
