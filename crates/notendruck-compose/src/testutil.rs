// SPDX-License-Identifier: MIT
//
// Shared PDF fixtures for unit tests.

use lopdf::{Document, Stream, dictionary};

use crate::stamp::real;

/// Build a minimal single-page PDF with the given page size in points.
pub(crate) fn blank_pdf(width: f64, height: f64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), real(width), real(height)],
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

/// Byte-level substring search, for asserting on content streams.
pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Page size of the first page, in points.
pub(crate) fn first_page_size(pdf: &[u8]) -> (f64, f64) {
    let stamper = crate::stamp::Stamper::from_template(pdf).unwrap();
    (stamper.page_width(), stamper.page_height())
}
