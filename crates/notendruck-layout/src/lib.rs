// SPDX-License-Identifier: MIT
//
// notendruck-layout — Static per-product geometry and layout defaults.
//
// Pure data and small pure functions only: trim sizes, bleed allowances,
// font mapping, default text/QR/logo placement, German date rendering,
// and mm↔point conversion. No I/O lives here.

pub mod date;
pub mod geometry;
pub mod units;

pub use date::format_localized_date;
pub use geometry::{
    bleed_mm, bleed_points, default_date_placement, default_logo_placement,
    default_qr_placement, default_text_placement, font_family, is_back_variant, page_size_mm,
    page_size_points, requires_logo, supports_qr_code,
};
pub use units::{mm_to_points, points_to_mm};
