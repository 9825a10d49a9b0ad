// SPDX-License-Identifier: MIT
//
// Font resolution: fetch TTF files from the store, extract the metrics
// needed for centering, and cache per family for the process lifetime.
//
// A font that cannot be fetched or parsed degrades to the builtin
// Helvetica fallback with approximate metrics — a warning, never a
// generation failure.

use std::collections::HashMap;
use std::sync::Arc;

use notendruck_core::error::{NotendruckError, Result};
use notendruck_store::AssetStore;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::winansi;

/// Average glyph width of the builtin fallback font, as a fraction of the
/// font size. Helvetica at mixed case averages roughly half an em.
const FALLBACK_WIDTH_FACTOR: f64 = 0.5;

/// Parsed font ready for embedding: raw bytes plus the per-WinAnsi-code
/// advance table used for measurement and the PDF /Widths array.
pub struct FontData {
    pub family: String,
    pub bytes: Vec<u8>,
    pub units_per_em: u16,
    /// Horizontal advance in font units, indexed by WinAnsi code.
    pub advances: [u16; 256],
    pub ascent: i16,
    pub descent: i16,
    pub cap_height: i16,
    pub bbox: [i16; 4],
}

impl FontData {
    /// Parse a TTF/OTF file and precompute the WinAnsi advance table.
    pub fn parse(family: &str, bytes: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|err| NotendruckError::FontUnavailable(format!("{family}: {err}")))?;

        let units_per_em = face.units_per_em();
        let default_advance = units_per_em / 2;

        let mut advances = [0u16; 256];
        for code in 0x20..=0xFFu16 {
            let c = winansi::decode(code as u8);
            advances[code as usize] = face
                .glyph_index(c)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .unwrap_or(default_advance);
        }

        let bbox = face.global_bounding_box();

        Ok(Self {
            family: family.to_string(),
            units_per_em,
            advances,
            ascent: face.ascender(),
            descent: face.descender(),
            cap_height: face.capital_height().unwrap_or(face.ascender()),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            bytes,
        })
    }

    /// Width of already-encoded text at the given size, in points.
    pub fn measure_encoded(&self, encoded: &[u8], font_size: f64) -> f64 {
        let units: u64 = encoded.iter().map(|b| self.advances[*b as usize] as u64).sum();
        units as f64 / self.units_per_em as f64 * font_size
    }
}

/// A font the compositor can draw with.
#[derive(Clone)]
pub enum ResolvedFont {
    /// Uploaded TrueType font, embedded into the output PDF.
    Embedded(Arc<FontData>),
    /// Builtin Helvetica (base-14), used when the family is unavailable.
    Builtin,
}

impl ResolvedFont {
    /// Measure a text line at the given size, in points.
    ///
    /// The builtin path uses the approximate average-width factor; it only
    /// has to be deterministic, since the fallback is a degraded mode.
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        let encoded = winansi::encode(text);
        match self {
            Self::Embedded(data) => data.measure_encoded(&encoded, font_size),
            Self::Builtin => encoded.len() as f64 * font_size * FALLBACK_WIDTH_FACTOR,
        }
    }
}

/// Process-lifetime cache of fetched fonts, keyed by family.
///
/// Written at most once per family. A race between two first fetches of
/// the same family is benign — the font is fetched twice and the second
/// insert wins, with identical content.
pub struct FontCache {
    assets: Arc<AssetStore>,
    cache: Mutex<HashMap<String, Arc<FontData>>>,
}

impl FontCache {
    pub fn new(assets: Arc<AssetStore>) -> Self {
        Self {
            assets,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a family to a drawable font, falling back to the builtin
    /// font on any fetch or parse failure.
    pub async fn resolve(&self, family: &str) -> ResolvedFont {
        if let Some(data) = self.cache.lock().await.get(family) {
            return ResolvedFont::Embedded(Arc::clone(data));
        }

        let fetched = self.assets.get_font(family).await;
        match fetched.and_then(|bytes| FontData::parse(family, bytes)) {
            Ok(data) => {
                debug!(family, "font loaded and cached");
                let data = Arc::new(data);
                self.cache
                    .lock()
                    .await
                    .insert(family.to_string(), Arc::clone(&data));
                ResolvedFont::Embedded(data)
            }
            Err(err) => {
                warn!(family, error = %err, "font unavailable, using builtin fallback");
                ResolvedFont::Builtin
            }
        }
    }
}
