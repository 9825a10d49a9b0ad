// SPDX-License-Identifier: MIT
//
// Printable compositor — fetches a template, overlays text, QR code, and
// logo, and finishes with the bleed wrap.
//
// Degradation rules: a missing template fails the item; a missing or
// unparseable font falls back to builtin Helvetica; a malformed logo is
// skipped. Only the template itself is load-bearing.

use std::sync::Arc;

use notendruck_core::error::{NotendruckError, Result};
use notendruck_core::types::{
    ImagePlacement, QrPlacement, Rgb, TemplateType, TextElement, TextPlacement,
};
use notendruck_layout::geometry;
use notendruck_store::AssetStore;
use tracing::{debug, instrument, warn};

use crate::bleed::add_bleed;
use crate::fonts::{FontCache, ResolvedFont};
use crate::images::{self, RasterImage};
use crate::qr::QrImage;
use crate::stamp::Stamper;
use crate::text;

/// Caption size under the QR code on back variants.
const QR_CAPTION_SIZE: f64 = 9.0;

/// Gap between the QR code's bottom edge and the caption baseline.
const QR_CAPTION_GAP: f64 = 16.0;

/// Composes printables by stamping overlays onto stored templates.
pub struct Compositor {
    assets: Arc<AssetStore>,
    fonts: FontCache,
}

impl Compositor {
    pub fn new(assets: Arc<AssetStore>) -> Self {
        let fonts = FontCache::new(Arc::clone(&assets));
        Self { assets, fonts }
    }

    // -- Entry points ---------------------------------------------------------

    /// Compose a printable using the static default placements.
    ///
    /// Front types get the school name and localized date; QR-supporting
    /// types get the code (with a caption on back variants); logo-carrying
    /// types get the logo when one is supplied.
    #[instrument(skip(self, qr, logo), fields(template_type = %template_type))]
    pub async fn compose_fixed(
        &self,
        template_type: TemplateType,
        school_name: &str,
        event_date: &str,
        qr: Option<&QrImage>,
        logo: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let mut stamper = self.open_template(template_type).await?;
        let font = self
            .fonts
            .resolve(geometry::font_family(template_type))
            .await;

        if let Some(placement) = geometry::default_text_placement(template_type) {
            self.draw_anchored(&mut stamper, school_name, &placement, &font)?;
        }
        if let Some(placement) = geometry::default_date_placement(template_type) {
            let formatted = notendruck_layout::date::format_localized_date(event_date)?;
            self.draw_anchored(&mut stamper, &formatted, &placement, &font)?;
        }

        self.draw_qr(&mut stamper, template_type, None, qr, &font)?;
        self.draw_logo(&mut stamper, template_type, logo)?;

        let stamped = stamper.finish()?;
        add_bleed(&stamped, geometry::bleed_points(template_type))
    }

    /// Compose a printable from editor-positioned elements.
    ///
    /// Back variants draw only the QR code and caption; any supplied text
    /// elements are ignored for them. Front types draw every element in
    /// its own box, block-centered.
    #[instrument(
        skip(self, text_elements, qr, logo),
        fields(template_type = %template_type, elements = text_elements.len())
    )]
    pub async fn compose_from_editor_state(
        &self,
        template_type: TemplateType,
        text_elements: &[TextElement],
        qr_placement: Option<QrPlacement>,
        qr: Option<&QrImage>,
        logo: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let mut stamper = self.open_template(template_type).await?;
        let font = self
            .fonts
            .resolve(geometry::font_family(template_type))
            .await;

        if geometry::is_back_variant(template_type) {
            if !text_elements.is_empty() {
                debug!(
                    dropped = text_elements.len(),
                    "Back variant ignores text elements"
                );
            }
        } else if !text_elements.is_empty() {
            let font_name = stamper.register_font(&font)?;
            for element in text_elements {
                let lines = text::layout_box_block(
                    &element.text,
                    element.x,
                    element.y,
                    element.width,
                    element.height,
                    element.font_size,
                    &font,
                );
                stamper.push_ops(&text::text_ops(
                    &lines,
                    &font_name,
                    element.font_size,
                    element.color,
                ));
            }
        }

        self.draw_qr(&mut stamper, template_type, qr_placement, qr, &font)?;
        self.draw_logo(&mut stamper, template_type, logo)?;

        let stamped = stamper.finish()?;
        add_bleed(&stamped, geometry::bleed_points(template_type))
    }

    // -- Overlay pieces -------------------------------------------------------

    async fn open_template(&self, template_type: TemplateType) -> Result<Stamper> {
        let bytes = self
            .assets
            .get_template(template_type)
            .await?
            .ok_or_else(|| NotendruckError::TemplateNotFound(template_type.slug().to_string()))?;
        Stamper::from_template(&bytes)
    }

    /// Draw anchored text, shrinking the font to honor `max_width`.
    fn draw_anchored(
        &self,
        stamper: &mut Stamper,
        content: &str,
        placement: &TextPlacement,
        font: &ResolvedFont,
    ) -> Result<()> {
        let mut placement = placement.clone();
        if let Some(max_width) = placement.max_width {
            let widest = content
                .split('\n')
                .map(|line| font.measure(line.trim_end(), placement.font_size))
                .fold(0.0f64, f64::max);
            if widest > max_width {
                placement.font_size *= max_width / widest;
            }
        }

        let lines = text::layout_anchored(content, &placement, font);
        let font_name = stamper.register_font(font)?;
        stamper.push_ops(&text::text_ops(
            &lines,
            &font_name,
            placement.font_size,
            placement.color.unwrap_or(Rgb::BLACK),
        ));
        Ok(())
    }

    /// Draw the QR code (and caption, on back variants) if the type
    /// supports one and a code was generated.
    fn draw_qr(
        &self,
        stamper: &mut Stamper,
        template_type: TemplateType,
        placement: Option<QrPlacement>,
        qr: Option<&QrImage>,
        font: &ResolvedFont,
    ) -> Result<()> {
        if !geometry::supports_qr_code(template_type) {
            return Ok(());
        }
        let Some(qr) = qr else {
            return Ok(());
        };
        let Some(placement) = placement.or_else(|| geometry::default_qr_placement(template_type))
        else {
            return Ok(());
        };

        let name = stamper.register_image(qr.width, qr.height, &qr.rgb)?;
        let target = ImagePlacement {
            x: placement.x,
            y: placement.y,
            width: placement.size,
            height: placement.size,
            fit: notendruck_core::types::ImageFit::Stretch,
        };
        let rect = images::fit_rect(qr.width, qr.height, &target);
        stamper.push_ops(&images::image_ops(&name, &target, &rect));

        if geometry::is_back_variant(template_type) {
            let caption = TextPlacement {
                x: placement.x + placement.size / 2.0,
                y: placement.y - QR_CAPTION_GAP,
                font_size: QR_CAPTION_SIZE,
                max_width: None,
                color: Some(Rgb::BLACK),
                align: notendruck_core::types::TextAlign::Center,
            };
            let lines = text::layout_anchored(&qr.url, &caption, font);
            let font_name = stamper.register_font(font)?;
            stamper.push_ops(&text::text_ops(
                &lines,
                &font_name,
                QR_CAPTION_SIZE,
                Rgb::BLACK,
            ));
        }
        Ok(())
    }

    /// Draw the logo on logo-carrying types. Absent or malformed logos
    /// degrade to a printable without one.
    fn draw_logo(
        &self,
        stamper: &mut Stamper,
        template_type: TemplateType,
        logo: Option<&[u8]>,
    ) -> Result<()> {
        if !geometry::requires_logo(template_type) {
            return Ok(());
        }
        let Some(placement) = geometry::default_logo_placement(template_type) else {
            return Ok(());
        };

        let Some(bytes) = logo else {
            warn!(template_type = %template_type, "No logo supplied, proceeding without logo");
            return Ok(());
        };

        let raster: RasterImage = match images::decode_logo(bytes) {
            Ok(raster) => raster,
            Err(err) => {
                warn!(template_type = %template_type, error = %err, "Logo unusable, skipping");
                return Ok(());
            }
        };

        let name = stamper.register_image(raster.width, raster.height, &raster.rgb)?;
        let rect = images::fit_rect(raster.width, raster.height, &placement);
        stamper.push_ops(&images::image_ops(&name, &placement, &rect));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::generate_qr;
    use crate::testutil::{blank_pdf, contains, first_page_size};
    use lopdf::{Document, Object};
    use notendruck_core::types::TextElementKind;
    use notendruck_layout::units::mm_to_points;
    use notendruck_store::MemoryObjectStore;
    use notendruck_store::keys::template_key;

    async fn compositor_with_templates(types: &[TemplateType]) -> Compositor {
        let store = Arc::new(MemoryObjectStore::new());
        for template_type in types {
            let (w, h) = geometry::page_size_points(*template_type);
            store.seed(&template_key(*template_type), blank_pdf(w, h)).await;
        }
        Compositor::new(Arc::new(AssetStore::new(store)))
    }

    fn any_stream_contains(pdf: &[u8], needle: &[u8]) -> bool {
        let doc = Document::load_mem(pdf).unwrap();
        doc.objects.values().any(|object| {
            matches!(object, Object::Stream(s) if contains(&s.content, needle))
        })
    }

    fn element(text: &str) -> TextElement {
        TextElement {
            id: "el-1".to_string(),
            kind: TextElementKind::Headline,
            text: text.to_string(),
            x: 20.0,
            y: 200.0,
            width: 200.0,
            height: 60.0,
            font_size: 18.0,
            color: Rgb::BLACK,
        }
    }

    #[tokio::test]
    async fn missing_template_is_a_not_found_error() {
        let compositor = compositor_with_templates(&[]).await;
        let err = compositor
            .compose_fixed(TemplateType::Button, "Grundschule Nord", "2025-06-12", None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Template not found"));
        assert!(err.to_string().contains("button"));
    }

    #[tokio::test]
    async fn front_type_draws_name_and_localized_date() {
        let compositor = compositor_with_templates(&[TemplateType::Flyer1]).await;
        let pdf = compositor
            .compose_fixed(TemplateType::Flyer1, "Grundschule Nord", "2025-06-12", None, None)
            .await
            .unwrap();
        assert!(any_stream_contains(&pdf, b"(Grundschule Nord) Tj"));
        assert!(any_stream_contains(&pdf, b"(12. Juni 2025) Tj"));
    }

    #[tokio::test]
    async fn flyer_output_grows_by_bleed() {
        let compositor = compositor_with_templates(&[TemplateType::Flyer1]).await;
        let pdf = compositor
            .compose_fixed(TemplateType::Flyer1, "Schule", "2025-06-12", None, None)
            .await
            .unwrap();
        let (width, height) = first_page_size(&pdf);
        assert!((width - mm_to_points(111.0)).abs() < 0.1);
        assert!((height - mm_to_points(154.0)).abs() < 0.1);
    }

    #[tokio::test]
    async fn back_variant_ignores_text_elements() {
        let compositor = compositor_with_templates(&[TemplateType::FlyerBack1]).await;
        let qr = generate_qr("https://aufnahme.example/e/K7X2").unwrap();
        let pdf = compositor
            .compose_from_editor_state(
                TemplateType::FlyerBack1,
                &[element("Grundschule Nord")],
                None,
                Some(&qr),
                None,
            )
            .await
            .unwrap();
        assert!(!any_stream_contains(&pdf, b"Grundschule Nord"));
        // The QR caption still appears.
        assert!(any_stream_contains(&pdf, b"(https://aufnahme.example/e/K7X2) Tj"));
    }

    #[tokio::test]
    async fn front_type_draws_editor_elements() {
        let compositor = compositor_with_templates(&[TemplateType::Flyer2]).await;
        let pdf = compositor
            .compose_from_editor_state(
                TemplateType::Flyer2,
                &[element("Sommerfest 2025")],
                None,
                None,
                None,
            )
            .await
            .unwrap();
        assert!(any_stream_contains(&pdf, b"(Sommerfest 2025) Tj"));
    }

    #[tokio::test]
    async fn minicard_without_logo_still_composes() {
        let compositor = compositor_with_templates(&[TemplateType::Minicard]).await;
        let pdf = compositor
            .compose_fixed(TemplateType::Minicard, "Schule", "2025-06-12", None, None)
            .await
            .unwrap();
        assert!(Document::load_mem(&pdf).is_ok());
    }

    #[tokio::test]
    async fn malformed_logo_is_skipped() {
        let compositor = compositor_with_templates(&[TemplateType::Minicard]).await;
        let pdf = compositor
            .compose_fixed(
                TemplateType::Minicard,
                "Schule",
                "2025-06-12",
                None,
                Some(&[0xDE, 0xAD]),
            )
            .await
            .unwrap();
        assert!(Document::load_mem(&pdf).is_ok());
    }

    #[tokio::test]
    async fn minicard_qr_has_no_caption() {
        let compositor = compositor_with_templates(&[TemplateType::Minicard]).await;
        let qr = generate_qr("https://aufnahme.example/e/AB12").unwrap();
        let pdf = compositor
            .compose_fixed(TemplateType::Minicard, "Schule", "2025-06-12", Some(&qr), None)
            .await
            .unwrap();
        assert!(!any_stream_contains(&pdf, b"(https://aufnahme.example/e/AB12) Tj"));
    }

    #[tokio::test]
    async fn name_shrinks_to_max_width() {
        let compositor = compositor_with_templates(&[TemplateType::Button]).await;
        let long_name = "Staatliche Gesamtschule am Nordufer der Elbe";
        let pdf = compositor
            .compose_fixed(TemplateType::Button, long_name, "2025-06-12", None, None)
            .await
            .unwrap();
        // Font was shrunk below the default 11 pt.
        assert!(!any_stream_contains(&pdf, b" 11.00 Tf"));
    }
}
