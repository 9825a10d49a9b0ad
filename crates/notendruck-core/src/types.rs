// SPDX-License-Identifier: MIT
//
// Core domain types for the Notendruck printable pipeline.

use serde::{Deserialize, Serialize};

/// One physical product variant.
///
/// Every variant maps 1:1 to a template object key, an output object key,
/// a physical size, a bleed allowance, and a font family (see the layout
/// and store crates). The enum is closed: adding a variant forces every
/// lookup `match` in the workspace to be extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateType {
    #[serde(rename = "flyer1")]
    Flyer1,
    #[serde(rename = "flyer2")]
    Flyer2,
    #[serde(rename = "flyer3")]
    Flyer3,
    #[serde(rename = "flyer1-back")]
    FlyerBack1,
    #[serde(rename = "flyer2-back")]
    FlyerBack2,
    #[serde(rename = "flyer3-back")]
    FlyerBack3,
    #[serde(rename = "button")]
    Button,
    #[serde(rename = "tshirt")]
    TShirt,
    #[serde(rename = "hoodie")]
    Hoodie,
    #[serde(rename = "minicard")]
    Minicard,
    #[serde(rename = "cd-jacket")]
    CdJacket,
    #[serde(rename = "tshirt-mockup")]
    MockupTShirt,
    #[serde(rename = "hoodie-mockup")]
    MockupHoodie,
}

impl TemplateType {
    /// Every template type, in the documented batch order: flyers front,
    /// flyers back, button, t-shirt, hoodie, minicard, CD jacket, mockups.
    pub const ALL: [TemplateType; 13] = [
        Self::Flyer1,
        Self::Flyer2,
        Self::Flyer3,
        Self::FlyerBack1,
        Self::FlyerBack2,
        Self::FlyerBack3,
        Self::Button,
        Self::TShirt,
        Self::Hoodie,
        Self::Minicard,
        Self::CdJacket,
        Self::MockupTShirt,
        Self::MockupHoodie,
    ];

    /// Stable string tag used in object keys and API payloads.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Flyer1 => "flyer1",
            Self::Flyer2 => "flyer2",
            Self::Flyer3 => "flyer3",
            Self::FlyerBack1 => "flyer1-back",
            Self::FlyerBack2 => "flyer2-back",
            Self::FlyerBack3 => "flyer3-back",
            Self::Button => "button",
            Self::TShirt => "tshirt",
            Self::Hoodie => "hoodie",
            Self::Minicard => "minicard",
            Self::CdJacket => "cd-jacket",
            Self::MockupTShirt => "tshirt-mockup",
            Self::MockupHoodie => "hoodie-mockup",
        }
    }

    /// Position of this type within [`TemplateType::ALL`]. Used to give
    /// merged batch results a stable display order.
    pub fn batch_index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|t| t == self)
            .expect("TemplateType::ALL covers every variant")
    }
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for TemplateType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| format!("unknown template type: {s}"))
    }
}

/// RGB color in the 0.0–1.0 range used by PDF `rg` operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

/// Horizontal alignment of a fixed text placement relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Where and how one static text block is drawn (legacy fixed path).
///
/// Coordinates are PDF points with a bottom-left origin. `x` is the anchor
/// point interpreted per `align`; `max_width` bounds centered text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextPlacement {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub max_width: Option<f64>,
    pub color: Option<Rgb>,
    pub align: TextAlign,
}

/// Semantic role of an operator-placed text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextElementKind {
    Headline,
    Subline,
    Calendar,
    Custom,
}

/// One operator-positioned text block from the editor.
///
/// Arrives already converted to PDF points (bottom-left origin) — the
/// editor UI owns the CSS-pixel ↔ point conversion via its canvas scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: String,
    pub kind: TextElementKind,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub color: Rgb,
}

/// Where the QR payload image is drawn. For back variants the caption URL
/// string is drawn beneath this square.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QrPlacement {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Aspect behavior when scaling a raster logo into its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    /// Scale to fit entirely within the box, preserving aspect ratio.
    #[default]
    Contain,
    /// Scale to fill the box, preserving aspect ratio; overflow is clipped.
    Cover,
    /// Scale each axis independently to the box dimensions.
    Stretch,
}

/// Box into which an embedded raster logo is placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fit: ImageFit,
}

/// Outcome of generating exactly one template type for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    /// Object key the generated PDF was uploaded under (on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn ok(template_type: TemplateType, key: String) -> Self {
        Self {
            success: true,
            template_type,
            key: Some(key),
            error: None,
        }
    }

    pub fn failed(template_type: TemplateType, error: impl Into<String>) -> Self {
        Self {
            success: false,
            template_type,
            key: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate of one full-event generation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGenerationResult {
    /// True iff at least one item succeeded (partial success still counts).
    pub success: bool,
    /// True iff some but not all items failed.
    pub partial_success: bool,
    pub event_id: String,
    pub results: Vec<GenerationResult>,
    pub errors: Vec<String>,
}

impl BatchGenerationResult {
    /// Build the aggregate from per-item results, deriving the success
    /// flags via [`classify`] — the single implementation of the
    /// partial-success rule.
    pub fn from_results(event_id: impl Into<String>, results: Vec<GenerationResult>) -> Self {
        let status = classify(&results);
        let errors = results
            .iter()
            .filter_map(|r| {
                r.error
                    .as_ref()
                    .map(|e| format!("{}: {}", r.template_type, e))
            })
            .collect();
        Self {
            success: status.success,
            partial_success: status.partial_success,
            event_id: event_id.into(),
            results,
            errors,
        }
    }

    /// Template types that failed in this pass.
    pub fn failed_types(&self) -> Vec<TemplateType> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.template_type)
            .collect()
    }
}

/// Derived success flags for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStatus {
    pub success: bool,
    pub partial_success: bool,
}

/// Classify per-item results into overall/partial success.
///
/// `success` is true iff at least one item succeeded. `partial_success`
/// is true iff the failure count is strictly between zero and the total.
pub fn classify(results: &[GenerationResult]) -> BatchStatus {
    let total = results.len();
    let failed = results.iter().filter(|r| !r.success).count();
    BatchStatus {
        success: failed < total,
        partial_success: failed > 0 && failed < total,
    }
}
