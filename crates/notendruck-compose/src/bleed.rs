// SPDX-License-Identifier: MIT
//
// Bleed expansion — re-embed a finished printable as a Form XObject on a
// page enlarged by the bleed margin on every side.
//
// The step runs for every printable, including those with a zero bleed, so
// all outputs go through the same serialisation path.

use lopdf::{Document, Object, Stream, dictionary};
use notendruck_core::error::{NotendruckError, Result};
use tracing::{debug, instrument, warn};

use crate::stamp::{Stamper, real};

fn pdf_err(err: lopdf::Error) -> NotendruckError {
    NotendruckError::Pdf(err.to_string())
}

/// Wrap a single-page printable in a page grown by `bleed` points per side.
///
/// The original page keeps its exact rendering; it is embedded as a Form
/// XObject and translated so its content sits centered inside the bleed
/// margin. Non-zero MediaBox origins are normalised away in the process.
#[instrument(skip(printable), fields(bytes_len = printable.len(), bleed))]
pub fn add_bleed(printable: &[u8], bleed: f64) -> Result<Vec<u8>> {
    let source = Document::load_mem(printable)
        .map_err(|err| NotendruckError::Pdf(format!("failed to reload printable: {err}")))?;

    let pages = source.get_pages();
    let first = pages
        .keys()
        .min()
        .copied()
        .ok_or_else(|| NotendruckError::Pdf("printable has no pages".to_string()))?;
    let page_id = pages[&first];

    // Reuse the stamper's MediaBox resolution for inherited boxes.
    let media_box = Stamper::from_template(printable)?.media_box();
    let (x0, y0) = (media_box[0], media_box[1]);
    let width = media_box[2] - x0;
    let height = media_box[3] - y0;

    let content = source.get_page_content(page_id).map_err(pdf_err)?;

    let mut target = Document::with_version("1.5");

    // Carry the page's resources into the form so fonts and images resolve.
    let resources = {
        let page = source.get_dictionary(page_id).map_err(pdf_err)?;
        match page.get(b"Resources") {
            Ok(entry) => deep_clone(&source, &mut target, entry)?,
            Err(_) => Object::Dictionary(lopdf::Dictionary::new()),
        }
    };

    let form_id = target.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                real(media_box[0]),
                real(media_box[1]),
                real(media_box[2]),
                real(media_box[3]),
            ],
            "Resources" => resources,
        },
        content,
    ));

    let pages_id = target.new_object_id();
    let draw = format!(
        "q\n1 0 0 1 {:.2} {:.2} cm\n/Tpl Do\nQ\n",
        bleed - x0,
        bleed - y0
    );
    let content_id = target.add_object(Stream::new(dictionary! {}, draw.into_bytes()));
    let new_page_id = target.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            real(width + 2.0 * bleed),
            real(height + 2.0 * bleed),
        ],
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Tpl" => form_id },
        },
        "Contents" => content_id,
    });
    target.set_object(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => vec![new_page_id.into()],
            "Count" => 1,
        },
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    target
        .save_to(&mut output)
        .map_err(|err| NotendruckError::Pdf(format!("failed to serialise bleed page: {err}")))?;

    debug!(
        width = width + 2.0 * bleed,
        height = height + 2.0 * bleed,
        "Bleed applied"
    );
    Ok(output)
}

/// Deep-clone an object graph from `source` into `target`, resolving
/// references into fresh target objects. /Parent entries are skipped to
/// avoid cycling back up the page tree.
fn deep_clone(source: &Document, target: &mut Document, object: &Object) -> Result<Object> {
    match object {
        Object::Dictionary(dict) => {
            let mut cloned = lopdf::Dictionary::new();
            for (key, value) in dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                let value = deep_clone(source, target, value)?;
                cloned.set(key.clone(), value);
            }
            Ok(Object::Dictionary(cloned))
        }
        Object::Array(array) => {
            let mut cloned = Vec::with_capacity(array.len());
            for item in array {
                cloned.push(deep_clone(source, target, item)?);
            }
            Ok(Object::Array(cloned))
        }
        Object::Reference(ref_id) => match source.get_object(*ref_id) {
            Ok(referenced) => {
                let cloned = deep_clone(source, target, referenced)?;
                let new_id = target.add_object(cloned);
                Ok(Object::Reference(new_id))
            }
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                Ok(Object::Null)
            }
        },
        Object::Stream(stream) => {
            let mut dict = lopdf::Dictionary::new();
            for (key, value) in stream.dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                let value = deep_clone(source, target, value)?;
                dict.set(key.clone(), value);
            }
            Ok(Object::Stream(Stream::new(dict, stream.content.clone())))
        }
        other => Ok(other.clone()),
    }
}
