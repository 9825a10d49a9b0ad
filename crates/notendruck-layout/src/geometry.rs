// SPDX-License-Identifier: MIT
//
// Static per-template-type geometry and layout defaults.
//
// Every function here is total over `TemplateType` — an unhandled variant
// is a compile error, not a runtime failure. All placement coordinates are
// PDF points with a bottom-left origin.

use notendruck_core::types::{
    ImageFit, ImagePlacement, QrPlacement, Rgb, TemplateType, TextAlign, TextPlacement,
};

use crate::units::mm_to_points;

/// Ink color used for event text on the flyer family.
const FLYER_INK: Rgb = Rgb::new(0.12, 0.16, 0.22);

/// Physical trim size of the product in millimetres (width, height).
pub fn page_size_mm(template_type: TemplateType) -> (f64, f64) {
    use TemplateType::*;
    match template_type {
        // A6 flyers, both sides.
        Flyer1 | Flyer2 | Flyer3 | FlyerBack1 | FlyerBack2 | FlyerBack3 => (105.0, 148.0),
        Button => (50.0, 50.0),
        TShirt => (200.0, 250.0),
        Hoodie => (250.0, 300.0),
        Minicard => (85.0, 55.0),
        CdJacket => (120.0, 120.0),
        MockupTShirt | MockupHoodie => (210.0, 210.0),
    }
}

/// Trim size in PDF points.
pub fn page_size_points(template_type: TemplateType) -> (f64, f64) {
    let (w, h) = page_size_mm(template_type);
    (mm_to_points(w), mm_to_points(h))
}

/// Bleed allowance in millimetres.
///
/// Button, apparel prints, and mockups carry no extra bleed: the button
/// template bakes its margin into the base dimensions, apparel transfers
/// are cut digitally, and mockups are never printed.
pub fn bleed_mm(template_type: TemplateType) -> f64 {
    use TemplateType::*;
    match template_type {
        Flyer1 | Flyer2 | Flyer3 | FlyerBack1 | FlyerBack2 | FlyerBack3 => 3.0,
        Button => 0.0,
        TShirt | Hoodie => 0.0,
        Minicard | CdJacket => 3.0,
        MockupTShirt | MockupHoodie => 0.0,
    }
}

/// Bleed allowance in PDF points.
pub fn bleed_points(template_type: TemplateType) -> f64 {
    mm_to_points(bleed_mm(template_type))
}

/// Font family resolved for this product. Maps to a `fonts/{family}.ttf`
/// object in the store; the compositor falls back to a builtin font when
/// the file cannot be fetched.
pub fn font_family(template_type: TemplateType) -> &'static str {
    use TemplateType::*;
    match template_type {
        Flyer1 | Flyer2 | Flyer3 => "Montserrat-SemiBold",
        FlyerBack1 | FlyerBack2 | FlyerBack3 => "Montserrat-Regular",
        Button => "Montserrat-SemiBold",
        TShirt | Hoodie => "Montserrat-Bold",
        Minicard => "OpenSans-Regular",
        CdJacket => "Montserrat-SemiBold",
        MockupTShirt | MockupHoodie => "Montserrat-SemiBold",
    }
}

/// Whether this type is the QR-only back side of a double-sided product.
/// Back variants never receive school-name or date text.
pub fn is_back_variant(template_type: TemplateType) -> bool {
    use TemplateType::*;
    match template_type {
        FlyerBack1 | FlyerBack2 | FlyerBack3 => true,
        Flyer1 | Flyer2 | Flyer3 | Button | TShirt | Hoodie | Minicard | CdJacket
        | MockupTShirt | MockupHoodie => false,
    }
}

/// Whether this type carries a QR code when a payload is available.
pub fn supports_qr_code(template_type: TemplateType) -> bool {
    use TemplateType::*;
    match template_type {
        FlyerBack1 | FlyerBack2 | FlyerBack3 | Minicard => true,
        Flyer1 | Flyer2 | Flyer3 | Button | TShirt | Hoodie | CdJacket | MockupTShirt
        | MockupHoodie => false,
    }
}

/// Whether this type embeds the school logo. A missing logo degrades to
/// generation without one; it is never fatal.
pub fn requires_logo(template_type: TemplateType) -> bool {
    use TemplateType::*;
    match template_type {
        Minicard | CdJacket => true,
        Flyer1 | Flyer2 | Flyer3 | FlyerBack1 | FlyerBack2 | FlyerBack3 | Button | TShirt
        | Hoodie | MockupTShirt | MockupHoodie => false,
    }
}

/// Default school-name placement for the legacy fixed path.
/// `None` for back variants, which carry no text.
pub fn default_text_placement(template_type: TemplateType) -> Option<TextPlacement> {
    use TemplateType::*;
    let (w, h) = page_size_points(template_type);

    let placement = match template_type {
        FlyerBack1 | FlyerBack2 | FlyerBack3 => return None,
        Flyer1 | Flyer2 | Flyer3 => TextPlacement {
            x: w / 2.0,
            y: h * 0.62,
            font_size: 24.0,
            max_width: Some(w - 40.0),
            color: Some(FLYER_INK),
            align: TextAlign::Center,
        },
        Button => TextPlacement {
            x: w / 2.0,
            y: h * 0.55,
            font_size: 11.0,
            max_width: Some(w - 24.0),
            color: Some(Rgb::BLACK),
            align: TextAlign::Center,
        },
        TShirt | Hoodie => TextPlacement {
            x: w / 2.0,
            y: h * 0.70,
            font_size: 42.0,
            max_width: Some(w - 80.0),
            color: Some(Rgb::BLACK),
            align: TextAlign::Center,
        },
        Minicard => TextPlacement {
            x: 14.0,
            y: h - 34.0,
            font_size: 12.0,
            max_width: Some(w * 0.55),
            color: Some(Rgb::BLACK),
            align: TextAlign::Left,
        },
        CdJacket => TextPlacement {
            x: w / 2.0,
            y: h * 0.78,
            font_size: 20.0,
            max_width: Some(w - 50.0),
            color: Some(Rgb::BLACK),
            align: TextAlign::Center,
        },
        MockupTShirt | MockupHoodie => TextPlacement {
            x: w / 2.0,
            y: h * 0.60,
            font_size: 26.0,
            max_width: Some(w * 0.50),
            color: Some(Rgb::BLACK),
            align: TextAlign::Center,
        },
    };

    Some(placement)
}

/// Default event-date placement, directly beneath the school name.
pub fn default_date_placement(template_type: TemplateType) -> Option<TextPlacement> {
    let name = default_text_placement(template_type)?;
    Some(TextPlacement {
        y: name.y - name.font_size * 1.5,
        font_size: (name.font_size * 0.62).max(8.0),
        ..name
    })
}

/// Default QR placement for types that support one.
pub fn default_qr_placement(template_type: TemplateType) -> Option<QrPlacement> {
    use TemplateType::*;
    let (w, h) = page_size_points(template_type);

    match template_type {
        FlyerBack1 | FlyerBack2 | FlyerBack3 => Some(QrPlacement {
            x: (w - 140.0) / 2.0,
            y: h * 0.38,
            size: 140.0,
        }),
        Minicard => Some(QrPlacement {
            x: w - 104.0,
            y: (h - 90.0) / 2.0,
            size: 90.0,
        }),
        _ => None,
    }
}

/// Default logo box for logo-carrying types.
pub fn default_logo_placement(template_type: TemplateType) -> Option<ImagePlacement> {
    use TemplateType::*;
    let (w, h) = page_size_points(template_type);

    match template_type {
        Minicard => Some(ImagePlacement {
            x: 14.0,
            y: 14.0,
            width: w * 0.40,
            height: h * 0.45,
            fit: ImageFit::Contain,
        }),
        CdJacket => Some(ImagePlacement {
            x: (w - 120.0) / 2.0,
            y: h * 0.30,
            width: 120.0,
            height: 120.0,
            fit: ImageFit::Contain,
        }),
        _ => None,
    }
}
