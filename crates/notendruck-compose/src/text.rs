// SPDX-License-Identifier: MIT
//
// Text layout: newline-split block centering and PDF text operators.
//
// Multi-line text is centered as a block, not per-character-justified:
// every line is horizontally centered by its own measured width, and the
// block of lines is vertically centered within its bounding box.

use notendruck_core::types::{Rgb, TextAlign, TextPlacement};

use crate::fonts::ResolvedFont;
use crate::winansi;

/// Ratio of line height to font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// One laid-out line: text plus the baseline origin it is drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Split into drawable lines, dropping blank ones.
fn lines_of(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Lay out a text block centered within an editor element box.
///
/// `(x, y)` is the bottom-left corner of the box. The first line's
/// baseline sits at `center_y + total_height/2 − font_size`, which
/// visually top-aligns the block's optical center with the box center.
pub fn layout_box_block(
    text: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    font_size: f64,
    font: &ResolvedFont,
) -> Vec<PositionedLine> {
    let lines = lines_of(text);
    if lines.is_empty() {
        return Vec::new();
    }

    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let total_height = lines.len() as f64 * line_height;
    let center_y = y + height / 2.0;
    let first_baseline = center_y + total_height / 2.0 - font_size;

    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let measured = font.measure(line, font_size);
            PositionedLine {
                text: (*line).to_string(),
                x: x + (width - measured) / 2.0,
                y: first_baseline - index as f64 * line_height,
            }
        })
        .collect()
}

/// Lay out text relative to a fixed anchor placement (legacy path).
///
/// The placement's `x` is the anchor interpreted per its alignment; lines
/// after the first stack downward at the standard line height.
pub fn layout_anchored(
    text: &str,
    placement: &TextPlacement,
    font: &ResolvedFont,
) -> Vec<PositionedLine> {
    let lines = lines_of(text);
    let line_height = placement.font_size * LINE_HEIGHT_FACTOR;

    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let measured = font.measure(line, placement.font_size);
            let x = match placement.align {
                TextAlign::Left => placement.x,
                TextAlign::Center => placement.x - measured / 2.0,
                TextAlign::Right => placement.x - measured,
            };
            PositionedLine {
                text: (*line).to_string(),
                x,
                y: placement.y - index as f64 * line_height,
            }
        })
        .collect()
}

/// Escape a WinAnsi-encoded byte for a PDF literal string.
fn push_escaped(out: &mut Vec<u8>, byte: u8) {
    match byte {
        b'(' | b')' | b'\\' => {
            out.push(b'\\');
            out.push(byte);
        }
        _ => out.push(byte),
    }
}

/// Emit PDF content-stream operators drawing the given lines.
pub fn text_ops(
    lines: &[PositionedLine],
    font_resource: &str,
    font_size: f64,
    color: Rgb,
) -> Vec<u8> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut ops = Vec::new();
    ops.extend_from_slice(b"BT\n");
    ops.extend_from_slice(
        format!("/{font_resource} {font_size:.2} Tf\n").as_bytes(),
    );
    ops.extend_from_slice(
        format!("{:.4} {:.4} {:.4} rg\n", color.r, color.g, color.b).as_bytes(),
    );

    for line in lines {
        ops.extend_from_slice(format!("1 0 0 1 {:.2} {:.2} Tm\n", line.x, line.y).as_bytes());
        ops.push(b'(');
        for byte in winansi::encode(&line.text) {
            push_escaped(&mut ops, byte);
        }
        ops.extend_from_slice(b") Tj\n");
    }

    ops.extend_from_slice(b"ET\n");
    ops
}
