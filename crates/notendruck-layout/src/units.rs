// SPDX-License-Identifier: MIT
//
// Unit conversion between millimetres and PDF points.
//
// 1 point = 1/72 inch, 1 inch = 25.4 mm. All compositing happens in points
// with a bottom-left origin; physical product sizes are specified in mm.

pub const POINTS_PER_INCH: f64 = 72.0;
pub const MM_PER_INCH: f64 = 25.4;

/// Convert millimetres to PDF points.
pub fn mm_to_points(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

/// Convert PDF points to millimetres.
pub fn points_to_mm(points: f64) -> f64 {
    points / POINTS_PER_INCH * MM_PER_INCH
}
