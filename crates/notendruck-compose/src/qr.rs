// SPDX-License-Identifier: MIT
//
// QR payload rasterization. One QR image is generated per batch and
// reused for every QR-supporting template type.

use notendruck_core::error::{NotendruckError, Result};
use qrcode::{EcLevel, QrCode};

/// Pixels rendered per QR module. High enough that the print raster stays
/// crisp at the largest placement (140 pt).
const PIXELS_PER_MODULE: u32 = 8;

/// Quiet-zone width in modules, per the QR specification minimum.
const QUIET_ZONE_MODULES: u32 = 4;

/// Rasterized QR payload, kept as raw RGB rows for direct PDF embedding.
#[derive(Clone)]
pub struct QrImage {
    /// The encoded target URL, also drawn as the caption on back variants.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Encode a URL into a black-on-white QR raster.
///
/// Encoder settings are fixed (error correction M, fixed module size and
/// quiet zone), so the output is deterministic for a given URL.
pub fn generate_qr(url: &str) -> Result<QrImage> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)
        .map_err(|err| NotendruckError::Qr(format!("{url}: {err}")))?;

    let modules = code.width() as u32;
    let total_modules = modules + 2 * QUIET_ZONE_MODULES;
    let size_px = total_modules * PIXELS_PER_MODULE;

    // White canvas, then stamp dark modules.
    let mut rgb = vec![0xFFu8; (size_px * size_px * 3) as usize];
    for module_y in 0..modules {
        for module_x in 0..modules {
            if code[(module_x as usize, module_y as usize)] != qrcode::Color::Dark {
                continue;
            }
            let px0 = (module_x + QUIET_ZONE_MODULES) * PIXELS_PER_MODULE;
            let py0 = (module_y + QUIET_ZONE_MODULES) * PIXELS_PER_MODULE;
            for py in py0..py0 + PIXELS_PER_MODULE {
                let row_start = ((py * size_px + px0) * 3) as usize;
                rgb[row_start..row_start + (PIXELS_PER_MODULE * 3) as usize].fill(0x00);
            }
        }
    }

    Ok(QrImage {
        url: url.to_string(),
        width: size_px,
        height: size_px,
        rgb,
    })
}
