// SPDX-License-Identifier: MIT
//
// Store health check: enumerate every required template and font key and
// report what is missing, without downloading content.
//
// Templates and fonts form a fixed finite set, so missing assets are
// enumerable in advance. Callers use this as a pre-flight gate: when
// required templates are missing it is better to block a batch run than
// to attempt-and-fail per item.

use notendruck_core::types::TemplateType;
use notendruck_layout::font_family;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assets::AssetStore;
use crate::keys;

/// Result of probing every known template and font key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    pub healthy: bool,
    pub bucket_accessible: bool,
    /// Template type slugs whose base template exists.
    pub templates_found: Vec<String>,
    /// Template type slugs with no uploaded template.
    pub templates_missing: Vec<String>,
    pub fonts_found: Vec<String>,
    pub fonts_missing: Vec<String>,
    /// Human-readable summaries of anything wrong.
    pub errors: Vec<String>,
}

/// Distinct font families referenced by any template type, in first-use
/// order.
pub fn required_font_families() -> Vec<&'static str> {
    let mut families = Vec::new();
    for template_type in TemplateType::ALL {
        let family = font_family(template_type);
        if !families.contains(&family) {
            families.push(family);
        }
    }
    families
}

/// Probe existence of every template and font key.
pub async fn run_health_check(assets: &AssetStore) -> StoreHealth {
    let mut health = StoreHealth {
        healthy: false,
        bucket_accessible: true,
        templates_found: Vec::new(),
        templates_missing: Vec::new(),
        fonts_found: Vec::new(),
        fonts_missing: Vec::new(),
        errors: Vec::new(),
    };

    for template_type in TemplateType::ALL {
        let key = keys::template_key(template_type);
        match assets.store().exists(&key).await {
            Ok(true) => health.templates_found.push(template_type.slug().to_string()),
            Ok(false) => health.templates_missing.push(template_type.slug().to_string()),
            Err(err) => {
                health.bucket_accessible = false;
                health.errors.push(format!("cannot probe {key}: {err}"));
            }
        }
    }

    for family in required_font_families() {
        let key = keys::font_key(family);
        match assets.store().exists(&key).await {
            Ok(true) => health.fonts_found.push(family.to_string()),
            Ok(false) => health.fonts_missing.push(family.to_string()),
            Err(err) => {
                health.bucket_accessible = false;
                health.errors.push(format!("cannot probe {key}: {err}"));
            }
        }
    }

    if !health.templates_missing.is_empty() {
        health.errors.push(format!(
            "{} template(s) missing: {}",
            health.templates_missing.len(),
            health.templates_missing.join(", ")
        ));
    }
    if !health.fonts_missing.is_empty() {
        health.errors.push(format!(
            "{} font(s) missing: {}",
            health.fonts_missing.len(),
            health.fonts_missing.join(", ")
        ));
    }

    health.healthy = health.bucket_accessible
        && health.templates_missing.is_empty()
        && health.fonts_missing.is_empty();

    if health.healthy {
        info!(
            templates = health.templates_found.len(),
            fonts = health.fonts_found.len(),
            "store health check passed"
        );
    } else {
        warn!(
            templates_missing = health.templates_missing.len(),
            fonts_missing = health.fonts_missing.len(),
            bucket_accessible = health.bucket_accessible,
            "store health check failed"
        );
    }

    health
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryObjectStore;
    use std::sync::Arc;

    async fn seeded_store(skip_templates: &[TemplateType]) -> AssetStore {
        let store = Arc::new(MemoryObjectStore::new());
        for template_type in TemplateType::ALL {
            if skip_templates.contains(&template_type) {
                continue;
            }
            store
                .seed(&keys::template_key(template_type), b"%PDF-1.5".to_vec())
                .await;
        }
        for family in required_font_families() {
            store.seed(&keys::font_key(family), vec![0u8; 4]).await;
        }
        AssetStore::new(store)
    }

    #[test]
    fn four_distinct_font_families() {
        let families = required_font_families();
        assert_eq!(families.len(), 4);
        assert!(families.contains(&"Montserrat-Bold"));
        assert!(families.contains(&"OpenSans-Regular"));
    }

    #[tokio::test]
    async fn fully_seeded_store_is_healthy() {
        let assets = seeded_store(&[]).await;
        let health = run_health_check(&assets).await;
        assert!(health.healthy);
        assert!(health.bucket_accessible);
        assert_eq!(health.templates_found.len(), 13);
        assert!(health.templates_missing.is_empty());
        assert!(health.errors.is_empty());
    }

    #[tokio::test]
    async fn missing_templates_are_named_exactly() {
        let assets = seeded_store(&[TemplateType::Button, TemplateType::Minicard]).await;
        let health = run_health_check(&assets).await;

        assert!(!health.healthy);
        assert!(health.bucket_accessible);
        assert_eq!(health.templates_missing, vec!["button", "minicard"]);
        assert_eq!(health.templates_found.len(), 11);
        assert!(
            health
                .errors
                .iter()
                .any(|e| e.contains("button") && e.contains("minicard")),
            "summary should name the missing templates: {:?}",
            health.errors
        );
    }

    #[tokio::test]
    async fn empty_bucket_reports_everything_missing() {
        let assets = AssetStore::new(Arc::new(MemoryObjectStore::new()));
        let health = run_health_check(&assets).await;
        assert!(!health.healthy);
        assert_eq!(health.templates_missing.len(), 13);
        assert_eq!(health.fonts_missing.len(), 4);
    }
}
