// SPDX-License-Identifier: MIT
//
// Raster logo handling: decode, and aspect-preserving fit into a box.

use notendruck_core::error::{NotendruckError, Result};
use notendruck_core::types::{ImageFit, ImagePlacement};

/// Decoded raster image as raw RGB rows.
#[derive(Debug)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Decode a logo upload (PNG/JPEG/...) into raw RGB.
pub fn decode_logo(bytes: &[u8]) -> Result<RasterImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| NotendruckError::Image(format!("logo decode failed: {err}")))?;

    let rgb_image = decoded.to_rgb8();
    Ok(RasterImage {
        width: rgb_image.width(),
        height: rgb_image.height(),
        rgb: rgb_image.into_raw(),
    })
}

/// Where an image ends up after fitting into its placement box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Whether the draw must be clipped to the placement box (cover mode
    /// overflows it on one axis).
    pub clip: bool,
}

/// Compute the draw rectangle for an image of `(img_w, img_h)` pixels
/// inside a placement box, honoring the fit mode.
pub fn fit_rect(img_w: u32, img_h: u32, placement: &ImagePlacement) -> FittedRect {
    let image_w = img_w.max(1) as f64;
    let image_h = img_h.max(1) as f64;

    match placement.fit {
        ImageFit::Stretch => FittedRect {
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
            clip: false,
        },
        ImageFit::Contain | ImageFit::Cover => {
            let scale_x = placement.width / image_w;
            let scale_y = placement.height / image_h;
            let scale = if placement.fit == ImageFit::Contain {
                scale_x.min(scale_y)
            } else {
                scale_x.max(scale_y)
            };
            let width = image_w * scale;
            let height = image_h * scale;
            FittedRect {
                x: placement.x + (placement.width - width) / 2.0,
                y: placement.y + (placement.height - height) / 2.0,
                width,
                height,
                clip: placement.fit == ImageFit::Cover,
            }
        }
    }
}

/// Emit content-stream operators drawing an image XObject into its fitted
/// rectangle, clipping to the placement box when required.
pub fn image_ops(resource: &str, placement: &ImagePlacement, rect: &FittedRect) -> Vec<u8> {
    let mut ops = Vec::new();
    ops.extend_from_slice(b"q\n");
    if rect.clip {
        ops.extend_from_slice(
            format!(
                "{:.2} {:.2} {:.2} {:.2} re W n\n",
                placement.x, placement.y, placement.width, placement.height
            )
            .as_bytes(),
        );
    }
    ops.extend_from_slice(
        format!(
            "{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{resource} Do\nQ\n",
            rect.width, rect.height, rect.x, rect.y
        )
        .as_bytes(),
    );
    ops
}
