// SPDX-License-Identifier: MIT
//
// Bucket key layout. This layout is a persisted contract — operator
// tooling and the admin UI address objects by these exact paths, so the
// builders here are the only place keys are assembled.

use notendruck_core::types::TemplateType;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const FONT_CONTENT_TYPE: &str = "font/ttf";

/// Key of the blank base template for a product.
pub fn template_key(template_type: TemplateType) -> String {
    format!("templates/{}-template.pdf", template_type.slug())
}

/// Key of an uploaded font file.
pub fn font_key(family: &str) -> String {
    format!("fonts/{family}.ttf")
}

/// Whether a type is a customer-preview mockup rather than a print file.
fn is_mockup(template_type: TemplateType) -> bool {
    matches!(
        template_type,
        TemplateType::MockupTShirt | TemplateType::MockupHoodie
    )
}

/// Key a generated PDF is uploaded under for one event. Print-production
/// files live under `printables/`, customer previews under `mockups/`.
pub fn output_key(event_id: &str, template_type: TemplateType) -> String {
    let folder = if is_mockup(template_type) {
        "mockups"
    } else {
        "printables"
    };
    format!("events/{event_id}/{folder}/{}.pdf", template_type.slug())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_keys_follow_the_contract() {
        assert_eq!(
            template_key(TemplateType::Flyer1),
            "templates/flyer1-template.pdf"
        );
        assert_eq!(
            template_key(TemplateType::FlyerBack3),
            "templates/flyer3-back-template.pdf"
        );
    }

    #[test]
    fn font_keys_follow_the_contract() {
        assert_eq!(font_key("Montserrat-Bold"), "fonts/Montserrat-Bold.ttf");
    }

    #[test]
    fn printables_and_mockups_use_separate_folders() {
        assert_eq!(
            output_key("ev42", TemplateType::Button),
            "events/ev42/printables/button.pdf"
        );
        assert_eq!(
            output_key("ev42", TemplateType::MockupHoodie),
            "events/ev42/mockups/hoodie-mockup.pdf"
        );
    }

    #[test]
    fn output_keys_are_unique_per_event() {
        let mut keys: Vec<String> = TemplateType::ALL
            .iter()
            .map(|t| output_key("ev1", *t))
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), TemplateType::ALL.len());
    }
}
