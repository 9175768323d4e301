//! Template renderer.
//!
//! [`document_tree`] maps a [`PrintableDocument`] to a [`DocumentTree`] with a fixed skeleton:
//! letterhead, title banner, patient block, provider block, the kind-specific content, a
//! signature block and a footer. [`Renderer::render`] serializes that tree to HTML.
//!
//! Rendering is total and deterministic. It reads no clock: the "printed on" footer uses the
//! timestamp captured when the document was assembled, so the same document always renders to the
//! same bytes.

mod consultation;
pub mod html;
mod lab_order;
mod prescription;
pub mod style;
mod summary;

use crate::constants::{CONTENT_NOT_AVAILABLE, NOT_AVAILABLE};
use crate::document::{DocumentContent, PrintableDocument};
use crate::format::{age_on, display_date, format_date, format_date_time, parse_date};
use crate::layout::PageLayout;
use crate::markup::{present, Block, DocumentTree, Letterhead, Section, SectionBuilder};
use crate::names::capitalize;

/// Renders printable documents to HTML for one page layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct Renderer {
    layout: PageLayout,
}

impl Renderer {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    pub fn render(&self, document: &PrintableDocument) -> String {
        let tree = document_tree(document);
        tracing::debug!(
            kind = %document.kind(),
            record_id = %document.record_id(),
            sections = tree.sections.len(),
            "rendering document"
        );
        html::to_html(&tree, self.layout)
    }
}

/// Renders with the default A4 portrait layout.
pub fn render(document: &PrintableDocument) -> String {
    Renderer::default().render(document)
}

/// Builds the full document tree for `document`.
pub fn document_tree(document: &PrintableDocument) -> DocumentTree {
    let org = document.organization();

    let mut sections = vec![patient_section(document), provider_section(document)];
    sections.extend(content_sections(document));

    DocumentTree {
        title: document.kind().title().to_string(),
        theme_color: org.theme_color.clone(),
        letterhead: letterhead(document),
        sections,
        signature_labels: vec!["Provider Signature".to_string(), "Date".to_string()],
        footer_lines: vec![
            format!("Printed on {}", format_date_time(document.printed_at())),
            format!("Generated by {}", org.name),
        ],
    }
}

fn letterhead(document: &PrintableDocument) -> Letterhead {
    let org = document.organization();

    let mut contact_lines = Vec::new();
    if let Some(address) = present(org.address.as_deref()) {
        contact_lines.push(address.to_string());
    }
    let reach: Vec<String> = [
        present(org.phone.as_deref()).map(|p| format!("Phone: {p}")),
        present(org.email.as_deref()).map(|e| format!("Email: {e}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !reach.is_empty() {
        contact_lines.push(reach.join(" | "));
    }
    if let Some(website) = present(org.website.as_deref()) {
        contact_lines.push(website.to_string());
    }

    Letterhead {
        name: org.name.clone(),
        subtitle: capitalize(&org.org_type),
        contact_lines,
        logo_url: present(org.logo_url.as_deref()).map(str::to_string),
    }
}

fn patient_section(document: &PrintableDocument) -> Section {
    let patient = document.patient();
    let dob = patient.date_of_birth.as_deref();
    let age = dob
        .and_then(parse_date)
        .and_then(|birth| age_on(birth, document.printed_at().date_naive()))
        .map(|years| format!("{years} years"));

    SectionBuilder::new("Patient Information")
        .field("Name", Some(patient.full_name.as_str()), NOT_AVAILABLE)
        .field("Patient ID", Some(patient.id.as_str()), NOT_AVAILABLE)
        .field("Date of Birth", display_date(dob).as_deref(), NOT_AVAILABLE)
        .field_if("Age", age.as_deref())
        .field(
            "Gender",
            patient.gender.as_deref().map(capitalize).as_deref(),
            NOT_AVAILABLE,
        )
        .field("Phone", patient.phone.as_deref(), NOT_AVAILABLE)
        .field_if("Address", patient.address.as_deref())
        .build()
}

fn provider_section(document: &PrintableDocument) -> Section {
    let issuer = document.issuer();
    SectionBuilder::new("Provider Information")
        .field("Name", Some(issuer.full_name.as_str()), NOT_AVAILABLE)
        .field("Role", Some(issuer.role.as_str()), NOT_AVAILABLE)
        .field_if("Phone", issuer.phone.as_deref())
        .field(
            "Document Date",
            Some(format_date(document.created_at().date_naive()).as_str()),
            NOT_AVAILABLE,
        )
        .field("Record ID", Some(document.record_id().as_str()), NOT_AVAILABLE)
        .build()
}

/// Dispatches on the document content. Each arm is one content builder.
fn content_sections(document: &PrintableDocument) -> Vec<Section> {
    match document.content() {
        DocumentContent::Prescription(p) => prescription::sections(p, document),
        DocumentContent::LabOrder(order) => lab_order::sections(order),
        DocumentContent::Consultation(c) => consultation::sections(c),
        DocumentContent::PatientSummary(s) => summary::patient_summary_sections(s),
        DocumentContent::Insurance(policy) => summary::insurance_sections(policy, document),
        DocumentContent::Unavailable => vec![SectionBuilder::new("Details")
            .block(Block::Placeholder(CONTENT_NOT_AVAILABLE.to_string()))
            .build()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentKind, LabOrder, PatientSummary};
    use crate::test_support::{document, document_with};
    use serde_json::json;

    #[test]
    fn skeleton_has_fixed_section_order() {
        let doc = document(DocumentKind::LabOrder, json!({"tests": []}));
        let tree = document_tree(&doc);

        assert_eq!(tree.title, "LABORATORY ORDER");
        let headings: Vec<_> = tree
            .sections
            .iter()
            .map(|s| s.heading.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            headings,
            vec!["Patient Information", "Provider Information", "Tests Ordered"]
        );
        assert_eq!(tree.signature_labels, vec!["Provider Signature", "Date"]);
        assert!(tree.footer_lines[0].starts_with("Printed on March 5, 2024"));
        assert_eq!(tree.footer_lines[1], "Generated by Harbor Family Clinic");
    }

    #[test]
    fn title_lookup_per_kind() {
        for (kind, title) in [
            (DocumentKind::Prescription, "PRESCRIPTION"),
            (DocumentKind::LabOrder, "LABORATORY ORDER"),
            (DocumentKind::Consultation, "CONSULTATION RECORD"),
            (DocumentKind::Unknown("referral".into()), "MEDICAL DOCUMENT"),
        ] {
            let tree = document_tree(&document(kind, json!({})));
            assert_eq!(tree.title, title);
        }
    }

    #[test]
    fn unknown_kind_renders_placeholder() {
        let html = render(&document(DocumentKind::Unknown("referral".into()), json!({"x": 1})));
        assert!(html.contains("MEDICAL DOCUMENT"));
        assert!(html.contains("Content not available."));
    }

    #[test]
    fn patient_block_shows_age_and_fallbacks() {
        let doc = document(DocumentKind::LabOrder, json!({}));
        let html = render(&doc);
        assert!(html.contains("Amara Obi"));
        assert!(html.contains("June 15, 1990"));
        assert!(html.contains("33 years"));
        assert!(html.contains("Female"));
    }

    #[test]
    fn letterhead_carries_contact_details() {
        let tree = document_tree(&document(DocumentKind::LabOrder, json!({})));
        assert_eq!(tree.letterhead.subtitle, "Clinic");
        assert_eq!(
            tree.letterhead.contact_lines,
            vec![
                "4 Harbor Way, Port City".to_string(),
                "Phone: +1 555 0100 | Email: front@harbor.example".to_string()
            ]
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let doc = document(
            DocumentKind::Prescription,
            json!({"variant": "structured", "medications": [{"name": "Metformin"}]}),
        );
        assert_eq!(render(&doc), render(&doc));
    }

    #[test]
    fn renders_every_content_kind_without_missing_values() {
        let docs = [
            document_with(DocumentContent::LabOrder(LabOrder::default())),
            document_with(DocumentContent::PatientSummary(PatientSummary::default())),
            document(DocumentKind::Insurance, json!({})),
            document(DocumentKind::Consultation, json!({})),
            document(DocumentKind::Prescription, json!({"variant": "flat"})),
            document(DocumentKind::Prescription, json!({"variant": "structured"})),
        ];
        for doc in docs {
            let html = render(&doc);
            assert!(!html.is_empty());
            assert!(!html.contains("undefined"));
            assert!(!html.contains("Some("), "debug output leaked: {}", doc.kind());
        }
    }
}
