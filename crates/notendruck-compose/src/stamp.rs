// SPDX-License-Identifier: MIT
//
// Template stamping — open a single-page template PDF, register overlay
// resources (fonts, raster images) on its page, and append drawing
// operators on top of the existing content using `lopdf`.
//
// The original page content is wrapped in a q/Q pair so that whatever
// graphics state the template leaves behind cannot leak into the overlay.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use notendruck_core::error::{NotendruckError, Result};
use tracing::{debug, instrument};

use crate::fonts::{FontData, ResolvedFont};

fn pdf_err(err: lopdf::Error) -> NotendruckError {
    NotendruckError::Pdf(err.to_string())
}

/// lopdf stores reals as f32; all layout math stays in f64 until here.
pub(crate) fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

/// Where the page's /Resources entry lives, if anywhere.
enum ResourcesSlot {
    Direct,
    Referenced(ObjectId),
    Missing,
}

/// Stamps overlay content onto the first page of a template PDF.
#[derive(Debug)]
pub struct Stamper {
    document: Document,
    page_id: ObjectId,
    media_box: [f64; 4],
    overlay: Vec<u8>,
    next_resource: u32,
}

impl Stamper {
    // -- Construction ---------------------------------------------------------

    /// Load a template from raw PDF bytes.
    ///
    /// Only the first page is stamped; templates are single-page by
    /// convention but extra pages are tolerated and pass through untouched.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn from_template(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)
            .map_err(|err| NotendruckError::Pdf(format!("failed to load template: {err}")))?;

        let pages = document.get_pages();
        let first = pages
            .keys()
            .min()
            .copied()
            .ok_or_else(|| NotendruckError::Pdf("template has no pages".to_string()))?;
        let page_id = pages[&first];

        let media_box = resolve_media_box(&document, page_id)?;
        debug!(
            pages = pages.len(),
            width = media_box[2] - media_box[0],
            height = media_box[3] - media_box[1],
            "Template loaded"
        );

        Ok(Self {
            document,
            page_id,
            media_box,
            overlay: Vec::new(),
            next_resource: 0,
        })
    }

    /// The page's MediaBox as `[x0, y0, x1, y1]` in points.
    pub fn media_box(&self) -> [f64; 4] {
        self.media_box
    }

    pub fn page_width(&self) -> f64 {
        self.media_box[2] - self.media_box[0]
    }

    pub fn page_height(&self) -> f64 {
        self.media_box[3] - self.media_box[1]
    }

    // -- Resources ------------------------------------------------------------

    /// Register a font on the page and return its resource name.
    ///
    /// Embedded fonts get a full TrueType program with WinAnsi widths;
    /// the builtin fallback maps to base-14 Helvetica.
    pub fn register_font(&mut self, font: &ResolvedFont) -> Result<String> {
        let name = self.next_name("NdF");
        let font_object = match font {
            ResolvedFont::Builtin => {
                let id = self.document.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                });
                Object::Reference(id)
            }
            ResolvedFont::Embedded(data) => Object::Reference(self.embed_truetype(data)),
        };
        self.insert_resource("Font", &name, font_object)?;
        Ok(name)
    }

    /// Register a raw-RGB raster as an image XObject and return its
    /// resource name. Pixels are stored uncompressed in DeviceRGB.
    #[instrument(skip(self, rgb), fields(width, height))]
    pub fn register_image(&mut self, width: u32, height: u32, rgb: &[u8]) -> Result<String> {
        let name = self.next_name("NdIm");
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb.to_vec(),
        );
        let id = self.document.add_object(stream);
        self.insert_resource("XObject", &name, Object::Reference(id))?;
        Ok(name)
    }

    /// Append raw content-stream operators to the overlay.
    pub fn push_ops(&mut self, ops: &[u8]) {
        self.overlay.extend_from_slice(ops);
    }

    // -- Serialisation --------------------------------------------------------

    /// Wrap the original content in q/Q, append the overlay, and serialise.
    #[instrument(skip(self))]
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let original = self
            .document
            .get_page_content(self.page_id)
            .map_err(pdf_err)?;

        let mut content = Vec::with_capacity(original.len() + self.overlay.len() + 8);
        content.extend_from_slice(b"q\n");
        content.extend_from_slice(&original);
        content.extend_from_slice(b"\nQ\n");
        content.extend_from_slice(&self.overlay);

        self.document
            .change_page_content(self.page_id, content)
            .map_err(pdf_err)?;

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            NotendruckError::Pdf(format!("failed to serialise stamped PDF: {err}"))
        })?;

        debug!(output_bytes = output.len(), "Overlay stamped");
        Ok(output)
    }

    // -- Internals ------------------------------------------------------------

    fn next_name(&mut self, prefix: &str) -> String {
        self.next_resource += 1;
        format!("{prefix}{}", self.next_resource)
    }

    /// Embed a TrueType font program as a simple WinAnsi-encoded font.
    fn embed_truetype(&mut self, data: &FontData) -> ObjectId {
        let scale = 1000.0 / f64::from(data.units_per_em);

        let widths: Vec<Object> = (32..=255usize)
            .map(|code| Object::Integer((f64::from(data.advances[code]) * scale).round() as i64))
            .collect();

        let font_file = self.document.add_object(Stream::new(
            dictionary! { "Length1" => data.bytes.len() as i64 },
            data.bytes.clone(),
        ));

        let descriptor = self.document.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => data.family.as_str(),
            "Flags" => 32,
            "FontBBox" => vec![
                real(f64::from(data.bbox[0]) * scale),
                real(f64::from(data.bbox[1]) * scale),
                real(f64::from(data.bbox[2]) * scale),
                real(f64::from(data.bbox[3]) * scale),
            ],
            "ItalicAngle" => 0,
            "Ascent" => real(f64::from(data.ascent) * scale),
            "Descent" => real(f64::from(data.descent) * scale),
            "CapHeight" => real(f64::from(data.cap_height) * scale),
            "StemV" => 80,
            "FontFile2" => font_file,
        });

        self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => data.family.as_str(),
            "FirstChar" => 32,
            "LastChar" => 255,
            "Widths" => widths,
            "Encoding" => "WinAnsiEncoding",
            "FontDescriptor" => descriptor,
        })
    }

    fn resources_slot(&self) -> Result<ResourcesSlot> {
        let page = self.document.get_dictionary(self.page_id).map_err(pdf_err)?;
        Ok(match page.get(b"Resources") {
            Ok(Object::Reference(id)) => ResourcesSlot::Referenced(*id),
            Ok(Object::Dictionary(_)) => ResourcesSlot::Direct,
            _ => ResourcesSlot::Missing,
        })
    }

    fn resources_dict_mut(&mut self) -> Result<&mut Dictionary> {
        match self.resources_slot()? {
            ResourcesSlot::Referenced(id) => self
                .document
                .get_object_mut(id)
                .map_err(pdf_err)?
                .as_dict_mut()
                .map_err(pdf_err),
            slot => {
                let page = self
                    .document
                    .get_object_mut(self.page_id)
                    .map_err(pdf_err)?
                    .as_dict_mut()
                    .map_err(pdf_err)?;
                if matches!(slot, ResourcesSlot::Missing) {
                    page.set("Resources", Object::Dictionary(Dictionary::new()));
                }
                page.get_mut(b"Resources")
                    .map_err(pdf_err)?
                    .as_dict_mut()
                    .map_err(pdf_err)
            }
        }
    }

    /// Insert an entry into a category (/Font or /XObject) of the page's
    /// resources, creating the category if it is absent. A category held
    /// behind a reference is inlined first so existing entries survive.
    fn insert_resource(&mut self, category: &'static str, name: &str, value: Object) -> Result<()> {
        let referenced = {
            let resources = self.resources_dict_mut()?;
            match resources.get(category.as_bytes()) {
                Ok(Object::Reference(id)) => Some(*id),
                Ok(Object::Dictionary(_)) => None,
                _ => {
                    resources.set(category, Object::Dictionary(Dictionary::new()));
                    None
                }
            }
        };

        if let Some(id) = referenced {
            let inlined = self
                .document
                .get_dictionary(id)
                .map_err(pdf_err)?
                .clone();
            let resources = self.resources_dict_mut()?;
            resources.set(category, Object::Dictionary(inlined));
        }

        let resources = self.resources_dict_mut()?;
        match resources.get_mut(category.as_bytes()) {
            Ok(Object::Dictionary(dict)) => {
                dict.set(name, value);
                Ok(())
            }
            _ => Err(NotendruckError::Pdf(format!(
                "page resource category /{category} is not a dictionary"
            ))),
        }
    }
}

/// Resolve the effective MediaBox, following /Parent inheritance.
fn resolve_media_box(document: &Document, page_id: ObjectId) -> Result<[f64; 4]> {
    let mut current = page_id;
    // Page trees are shallow; the bound only guards against cycles.
    for _ in 0..32 {
        let dict = document.get_dictionary(current).map_err(pdf_err)?;

        if let Ok(entry) = dict.get(b"MediaBox") {
            let array = match entry {
                Object::Array(array) => array.clone(),
                Object::Reference(id) => document
                    .get_object(*id)
                    .map_err(pdf_err)?
                    .as_array()
                    .map_err(pdf_err)?
                    .clone(),
                _ => {
                    return Err(NotendruckError::Pdf(
                        "MediaBox is not an array".to_string(),
                    ));
                }
            };
            if array.len() != 4 {
                return Err(NotendruckError::Pdf(format!(
                    "MediaBox has {} entries, expected 4",
                    array.len()
                )));
            }
            let mut media_box = [0.0; 4];
            for (index, object) in array.iter().enumerate() {
                media_box[index] = number(object).ok_or_else(|| {
                    NotendruckError::Pdf("MediaBox entry is not numeric".to_string())
                })?;
            }
            return Ok(media_box);
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => current = *id,
            _ => break,
        }
    }

    Err(NotendruckError::Pdf(
        "template page has no MediaBox".to_string(),
    ))
}
