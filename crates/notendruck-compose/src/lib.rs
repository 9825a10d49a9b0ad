// SPDX-License-Identifier: MIT
//
// notendruck-compose — printable compositing for Notendruck.
//
// Stamps text, QR codes, and logos onto stored PDF templates and wraps
// the result in a bleed margin. Built on `lopdf` for the PDF plumbing,
// `ttf-parser` for font metrics, `qrcode` for code rasterization, and
// `image` for logo decoding.

pub mod bleed;
pub mod compositor;
pub mod fonts;
pub mod images;
pub mod qr;
pub mod stamp;
pub mod text;
pub mod winansi;

#[cfg(test)]
pub(crate) mod testutil;

pub use bleed::add_bleed;
pub use compositor::Compositor;
pub use fonts::{FontCache, FontData, ResolvedFont};
pub use qr::{QrImage, generate_qr};
pub use stamp::Stamper;
