// SPDX-License-Identifier: MIT
//
// Batch orchestrator — one event in, one `BatchGenerationResult` out.
//
// Items are generated strictly sequentially; every type is attempted
// independently and a single failure never aborts the batch. The QR
// image is rasterized once up front and reused across all items.

use std::collections::HashMap;
use std::sync::Arc;

use notendruck_compose::{Compositor, QrImage, generate_qr};
use notendruck_core::error::Result;
use notendruck_core::types::{
    BatchGenerationResult, GenerationResult, QrPlacement, TemplateType, TextElement,
};
use notendruck_layout::geometry;
use notendruck_store::AssetStore;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Operator-finalized configuration for one printable, as produced by the
/// layout editor. Coordinates arrive already converted to PDF points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintableItemConfig {
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_placement: Option<QrPlacement>,
}

impl PrintableItemConfig {
    /// Config with no finalized elements; composition falls back to the
    /// static default placements.
    pub fn defaults_for(template_type: TemplateType) -> Self {
        Self {
            template_type,
            text_elements: Vec::new(),
            qr_placement: None,
        }
    }
}

/// Outcome of the single up-front QR rasterization for a batch.
enum QrOutcome {
    /// No QR URL was requested.
    Absent,
    Ready(QrImage),
    /// Encoding failed; the batch proceeds without QR codes.
    Failed(String),
}

impl QrOutcome {
    fn image(&self) -> Option<&QrImage> {
        match self {
            Self::Ready(qr) => Some(qr),
            _ => None,
        }
    }
}

/// Drives printable generation for one event across all template types.
///
/// Explicitly constructed with its store handle; shared via `Arc` by the
/// HTTP layer.
pub struct Pipeline {
    compositor: Compositor,
    assets: Arc<AssetStore>,
}

impl Pipeline {
    pub fn new(assets: Arc<AssetStore>) -> Self {
        Self {
            compositor: Compositor::new(Arc::clone(&assets)),
            assets,
        }
    }

    // -- Batch entry points ---------------------------------------------------

    /// Generate every template type with the static default placements.
    #[instrument(skip(self, logo, qr_url), fields(event_id, school_name))]
    pub async fn generate_all(
        &self,
        event_id: &str,
        school_name: &str,
        event_date: &str,
        logo: Option<&[u8]>,
        qr_url: Option<&str>,
    ) -> BatchGenerationResult {
        info!(types = TemplateType::ALL.len(), "Generating printable batch");
        let qr = Self::build_qr(qr_url);

        let mut results = Vec::with_capacity(TemplateType::ALL.len());
        for template_type in TemplateType::ALL {
            let result = self
                .generate_fixed_item(
                    event_id,
                    template_type,
                    school_name,
                    event_date,
                    qr.image(),
                    logo,
                )
                .await;
            results.push(result);
        }

        let batch = BatchGenerationResult::from_results(event_id, results);
        info!(
            succeeded = batch.results.iter().filter(|r| r.success).count(),
            failed = batch.errors.len(),
            "Batch complete"
        );
        batch
    }

    /// Generate from operator-finalized item configs.
    ///
    /// Items are processed in the documented batch order regardless of the
    /// order configs arrive in. Back variants whose QR failed upstream are
    /// recorded as failures — a back side with neither QR nor text is a
    /// meaningless output. Items without finalized elements fall back to
    /// the static defaults.
    #[instrument(
        skip(self, item_configs, logo, qr_url),
        fields(event_id, items = item_configs.len())
    )]
    pub async fn generate_from_editor_configs(
        &self,
        event_id: &str,
        school_name: &str,
        event_date: &str,
        item_configs: &[PrintableItemConfig],
        logo: Option<&[u8]>,
        qr_url: Option<&str>,
    ) -> BatchGenerationResult {
        let qr = Self::build_qr(qr_url);

        let mut ordered: Vec<&PrintableItemConfig> = item_configs.iter().collect();
        ordered.sort_by_key(|config| config.template_type.batch_index());

        let mut results = Vec::with_capacity(ordered.len());
        for config in ordered {
            let result = self
                .generate_editor_item(event_id, school_name, event_date, config, &qr, logo)
                .await;
            results.push(result);
        }

        BatchGenerationResult::from_results(event_id, results)
    }

    /// Regenerate only the types that failed in `previous` and merge.
    ///
    /// The merge is keyed on template type: previously-succeeded items are
    /// carried forward unchanged, failed ones are replaced with the new
    /// attempt's outcome, independent of result ordering.
    #[instrument(
        skip(self, previous, item_configs, logo, qr_url),
        fields(event_id = %previous.event_id)
    )]
    pub async fn retry_failed(
        &self,
        previous: &BatchGenerationResult,
        school_name: &str,
        event_date: &str,
        item_configs: &[PrintableItemConfig],
        logo: Option<&[u8]>,
        qr_url: Option<&str>,
    ) -> BatchGenerationResult {
        let failed_types = previous.failed_types();
        info!(failed = failed_types.len(), "Retrying failed printables");

        let retry_configs: Vec<PrintableItemConfig> = failed_types
            .iter()
            .map(|template_type| {
                item_configs
                    .iter()
                    .find(|config| config.template_type == *template_type)
                    .cloned()
                    .unwrap_or_else(|| PrintableItemConfig::defaults_for(*template_type))
            })
            .collect();

        let retried = self
            .generate_from_editor_configs(
                &previous.event_id,
                school_name,
                event_date,
                &retry_configs,
                logo,
                qr_url,
            )
            .await;

        let mut merged: HashMap<TemplateType, GenerationResult> = previous
            .results
            .iter()
            .map(|result| (result.template_type, result.clone()))
            .collect();
        for result in retried.results {
            merged.insert(result.template_type, result);
        }

        let mut results: Vec<GenerationResult> = merged.into_values().collect();
        results.sort_by_key(|result| result.template_type.batch_index());

        BatchGenerationResult::from_results(previous.event_id.clone(), results)
    }

    /// Compose a single printable and return the bytes without uploading.
    #[instrument(
        skip(self, config, logo, qr_url),
        fields(event_id, template_type = %config.template_type)
    )]
    pub async fn generate_single_preview(
        &self,
        event_id: &str,
        config: &PrintableItemConfig,
        logo: Option<&[u8]>,
        qr_url: Option<&str>,
    ) -> Result<Vec<u8>> {
        let qr = match qr_url {
            Some(url) => Some(generate_qr(url)?),
            None => None,
        };
        self.compositor
            .compose_from_editor_state(
                config.template_type,
                &config.text_elements,
                config.qr_placement,
                qr.as_ref(),
                logo,
            )
            .await
    }

    // -- Per-item steps -------------------------------------------------------

    fn build_qr(qr_url: Option<&str>) -> QrOutcome {
        match qr_url {
            None => QrOutcome::Absent,
            Some(url) => match generate_qr(url) {
                Ok(qr) => QrOutcome::Ready(qr),
                Err(err) => {
                    warn!(error = %err, "QR generation failed, batch continues without QR codes");
                    QrOutcome::Failed(err.to_string())
                }
            },
        }
    }

    async fn generate_fixed_item(
        &self,
        event_id: &str,
        template_type: TemplateType,
        school_name: &str,
        event_date: &str,
        qr: Option<&QrImage>,
        logo: Option<&[u8]>,
    ) -> GenerationResult {
        match self
            .compositor
            .compose_fixed(template_type, school_name, event_date, qr, logo)
            .await
        {
            Ok(bytes) => self.upload_item(event_id, template_type, bytes).await,
            Err(err) => GenerationResult::failed(template_type, err.to_string()),
        }
    }

    async fn generate_editor_item(
        &self,
        event_id: &str,
        school_name: &str,
        event_date: &str,
        config: &PrintableItemConfig,
        qr: &QrOutcome,
        logo: Option<&[u8]>,
    ) -> GenerationResult {
        let template_type = config.template_type;

        if geometry::is_back_variant(template_type) {
            if let QrOutcome::Failed(reason) = qr {
                return GenerationResult::failed(
                    template_type,
                    format!("QR code generation failed, back side not generated: {reason}"),
                );
            }
        }

        let composed = if config.text_elements.is_empty()
            && !geometry::is_back_variant(template_type)
        {
            self.compositor
                .compose_fixed(template_type, school_name, event_date, qr.image(), logo)
                .await
        } else {
            self.compositor
                .compose_from_editor_state(
                    template_type,
                    &config.text_elements,
                    config.qr_placement,
                    qr.image(),
                    logo,
                )
                .await
        };

        match composed {
            Ok(bytes) => self.upload_item(event_id, template_type, bytes).await,
            Err(err) => GenerationResult::failed(template_type, err.to_string()),
        }
    }

    async fn upload_item(
        &self,
        event_id: &str,
        template_type: TemplateType,
        bytes: Vec<u8>,
    ) -> GenerationResult {
        match self.assets.upload_generated(event_id, template_type, bytes).await {
            Ok(key) => GenerationResult::ok(template_type, key),
            Err(err) => GenerationResult::failed(template_type, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, Stream, dictionary};
    use notendruck_layout::{mm_to_points, page_size_points};
    use notendruck_store::{MemoryObjectStore, ObjectStore};
    use notendruck_store::keys::{output_key, template_key};

    fn blank_pdf(width: f64, height: f64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                lopdf::Object::Real(width as f32),
                lopdf::Object::Real(height as f32),
            ],
            "Contents" => content_id,
        });
        doc.set_object(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            },
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    async fn seeded_store(types: &[TemplateType]) -> Arc<MemoryObjectStore> {
        let store = Arc::new(MemoryObjectStore::new());
        for template_type in types {
            let (w, h) = page_size_points(*template_type);
            store.seed(&template_key(*template_type), blank_pdf(w, h)).await;
        }
        store
    }

    fn pipeline(store: Arc<MemoryObjectStore>) -> Pipeline {
        Pipeline::new(Arc::new(AssetStore::new(store)))
    }

    fn first_page_size(pdf: &[u8]) -> (f64, f64) {
        let stamper = notendruck_compose::Stamper::from_template(pdf).unwrap();
        (stamper.page_width(), stamper.page_height())
    }

    #[tokio::test]
    async fn fully_seeded_batch_succeeds_for_all_types() {
        let store = seeded_store(&TemplateType::ALL).await;
        let pipeline = pipeline(Arc::clone(&store));
        let batch = pipeline
            .generate_all(
                "ev1",
                "Grundschule Nord",
                "2025-06-12",
                None,
                Some("https://aufnahme.example/e/K7X2"),
            )
            .await;

        assert!(batch.success);
        assert!(!batch.partial_success);
        assert_eq!(batch.results.len(), TemplateType::ALL.len());
        assert!(batch.results.iter().all(|r| r.success));
        assert!(store.exists(&output_key("ev1", TemplateType::Flyer1)).await.unwrap());
        assert!(store.exists(&output_key("ev1", TemplateType::MockupHoodie)).await.unwrap());
    }

    #[tokio::test]
    async fn missing_template_fails_that_item_and_batch_continues() {
        let all_but_button: Vec<TemplateType> = TemplateType::ALL
            .into_iter()
            .filter(|t| *t != TemplateType::Button)
            .collect();
        let store = seeded_store(&all_but_button).await;
        let batch = pipeline(store)
            .generate_all("ev1", "Schule", "2025-06-12", None, None)
            .await;

        assert!(batch.success);
        assert!(batch.partial_success);
        let button = batch
            .results
            .iter()
            .find(|r| r.template_type == TemplateType::Button)
            .unwrap();
        assert!(!button.success);
        assert!(button.error.as_deref().unwrap().contains("Template not found"));
        // Every other type still generated.
        assert_eq!(batch.results.iter().filter(|r| r.success).count(), 12);
        assert_eq!(batch.errors.len(), 1);
        assert!(batch.errors[0].starts_with("button: "));
    }

    #[tokio::test]
    async fn results_follow_the_documented_batch_order() {
        let store = seeded_store(&TemplateType::ALL).await;
        let batch = pipeline(store)
            .generate_all("ev1", "Schule", "2025-06-12", None, None)
            .await;
        let order: Vec<TemplateType> = batch.results.iter().map(|r| r.template_type).collect();
        assert_eq!(order, TemplateType::ALL.to_vec());
    }

    #[tokio::test]
    async fn editor_configs_are_processed_in_batch_order() {
        let store = seeded_store(&TemplateType::ALL).await;
        let configs = vec![
            PrintableItemConfig::defaults_for(TemplateType::Minicard),
            PrintableItemConfig::defaults_for(TemplateType::Flyer1),
        ];
        let batch = pipeline(store)
            .generate_from_editor_configs("ev1", "Schule", "2025-06-12", &configs, None, None)
            .await;
        let order: Vec<TemplateType> = batch.results.iter().map(|r| r.template_type).collect();
        assert_eq!(order, vec![TemplateType::Flyer1, TemplateType::Minicard]);
    }

    #[tokio::test]
    async fn retry_regenerates_only_failed_types_and_merges_by_type() {
        // First run without the button template: 12 succeed, button fails.
        let all_but_button: Vec<TemplateType> = TemplateType::ALL
            .into_iter()
            .filter(|t| *t != TemplateType::Button)
            .collect();
        let store = seeded_store(&all_but_button).await;
        let pipeline = pipeline(Arc::clone(&store));
        let first = pipeline
            .generate_all("ev1", "Schule", "2025-06-12", None, None)
            .await;
        assert_eq!(first.failed_types(), vec![TemplateType::Button]);

        // Upload the missing template, then retry.
        let (w, h) = page_size_points(TemplateType::Button);
        store.seed(&template_key(TemplateType::Button), blank_pdf(w, h)).await;

        let merged = pipeline
            .retry_failed(&first, "Schule", "2025-06-12", &[], None, None)
            .await;

        assert!(merged.success);
        assert!(!merged.partial_success);
        assert_eq!(merged.results.len(), TemplateType::ALL.len());
        assert!(merged.results.iter().all(|r| r.success));
        assert!(merged.failed_types().is_empty());
        // Carried-forward items kept their original keys.
        let flyer = merged
            .results
            .iter()
            .find(|r| r.template_type == TemplateType::Flyer1)
            .unwrap();
        assert_eq!(flyer.key.as_deref(), Some("events/ev1/printables/flyer1.pdf"));
    }

    #[tokio::test]
    async fn back_items_fail_when_qr_generation_failed_upstream() {
        let store = seeded_store(&TemplateType::ALL).await;
        let configs = vec![
            PrintableItemConfig::defaults_for(TemplateType::Flyer1),
            PrintableItemConfig::defaults_for(TemplateType::FlyerBack1),
        ];
        // A payload too large for any QR version forces an encode failure.
        let oversized = "x".repeat(8000);
        let batch = pipeline(store)
            .generate_from_editor_configs(
                "ev1",
                "Schule",
                "2025-06-12",
                &configs,
                None,
                Some(&oversized),
            )
            .await;

        let back = batch
            .results
            .iter()
            .find(|r| r.template_type == TemplateType::FlyerBack1)
            .unwrap();
        assert!(!back.success);
        assert!(back.error.as_deref().unwrap().contains("QR code generation failed"));
        // The front item is unaffected.
        let front = batch
            .results
            .iter()
            .find(|r| r.template_type == TemplateType::Flyer1)
            .unwrap();
        assert!(front.success);
    }

    #[tokio::test]
    async fn preview_returns_bytes_without_uploading() {
        let store = seeded_store(&[TemplateType::Flyer1]).await;
        let pipeline = pipeline(Arc::clone(&store));
        let config = PrintableItemConfig {
            template_type: TemplateType::Flyer1,
            text_elements: vec![TextElement {
                id: "el-1".to_string(),
                kind: notendruck_core::types::TextElementKind::Headline,
                text: "Sommerkonzert".to_string(),
                x: 20.0,
                y: 180.0,
                width: 200.0,
                height: 50.0,
                font_size: 20.0,
                color: notendruck_core::types::Rgb::BLACK,
            }],
            qr_placement: None,
        };

        let bytes = pipeline
            .generate_single_preview("ev1", &config, None, None)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!store.exists(&output_key("ev1", TemplateType::Flyer1)).await.unwrap());
    }

    #[tokio::test]
    async fn flyer_outputs_carry_the_bleed_margin() {
        let store = seeded_store(&TemplateType::ALL).await;
        let pipeline = pipeline(Arc::clone(&store));
        pipeline
            .generate_all("ev1", "Schule", "2025-06-12", None, None)
            .await;

        let flyer = store.get(&output_key("ev1", TemplateType::Flyer1)).await.unwrap().unwrap();
        let (width, height) = first_page_size(&flyer);
        assert!((width - mm_to_points(111.0)).abs() < 0.1);
        assert!((height - mm_to_points(154.0)).abs() < 0.1);

        // Button has no bleed; the output page matches the template.
        let button = store.get(&output_key("ev1", TemplateType::Button)).await.unwrap().unwrap();
        let (width, height) = first_page_size(&button);
        assert!((width - mm_to_points(50.0)).abs() < 0.1);
        assert!((height - mm_to_points(50.0)).abs() < 0.1);
    }

    #[tokio::test]
    async fn regeneration_is_idempotent() {
        let store = seeded_store(&TemplateType::ALL).await;
        let pipeline = pipeline(Arc::clone(&store));

        let first = pipeline
            .generate_all("ev1", "Schule", "2025-06-12", None, None)
            .await;
        let key = output_key("ev1", TemplateType::Flyer1);
        let first_bytes = store.get(&key).await.unwrap().unwrap();

        let second = pipeline
            .generate_all("ev1", "Schule", "2025-06-12", None, None)
            .await;
        let second_bytes = store.get(&key).await.unwrap().unwrap();

        assert!(first.success && second.success);
        // Same key overwritten in place with equivalent content.
        let first_doc = Document::load_mem(&first_bytes).unwrap();
        let second_doc = Document::load_mem(&second_bytes).unwrap();
        let first_content = first_doc.get_page_content(first_doc.get_pages()[&1]).unwrap();
        let second_content = second_doc.get_page_content(second_doc.get_pages()[&1]).unwrap();
        assert_eq!(first_content, second_content);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_failures_surface_as_item_errors() {
        let store = seeded_store(&TemplateType::ALL).await;
        // Exhaust the retry budget for every upload.
        store.inject_put_failures(1000);
        let batch = pipeline(store)
            .generate_all("ev1", "Schule", "2025-06-12", None, None)
            .await;

        assert!(!batch.success);
        assert!(!batch.partial_success);
        assert!(batch.results.iter().all(|r| !r.success));
        assert_eq!(batch.errors.len(), TemplateType::ALL.len());
    }
}
