//! Shared fixtures for unit tests.

use crate::document::{
    DocumentContent, DocumentKind, DocumentParts, OrganizationInfo, PatientInfo,
    PrintableDocument, StaffInfo,
};
use chrono::{DateTime, TimeZone, Utc};
use clinic_types::NonEmptyText;

pub fn organization() -> OrganizationInfo {
    OrganizationInfo {
        name: "Harbor Family Clinic".into(),
        org_type: "clinic".into(),
        address: Some("4 Harbor Way, Port City".into()),
        phone: Some("+1 555 0100".into()),
        email: Some("front@harbor.example".into()),
        website: None,
        logo_url: None,
        theme_color: "#0f766e".into(),
    }
}

pub fn patient() -> PatientInfo {
    PatientInfo {
        id: "P-0042".into(),
        full_name: "Amara Obi".into(),
        first_name: Some("Amara".into()),
        last_name: Some("Obi".into()),
        date_of_birth: Some("1990-06-15".into()),
        gender: Some("female".into()),
        phone: Some("+1 555 0199".into()),
        address: None,
    }
}

pub fn issuer() -> StaffInfo {
    StaffInfo {
        full_name: "Dr. Kemi Okafor".into(),
        role: "Doctor".into(),
        phone: None,
    }
}

pub fn printed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
}

fn kind_of(content: &DocumentContent) -> DocumentKind {
    match content {
        DocumentContent::Prescription(_) => DocumentKind::Prescription,
        DocumentContent::LabOrder(_) => DocumentKind::LabOrder,
        DocumentContent::Consultation(_) => DocumentKind::Consultation,
        DocumentContent::PatientSummary(_) => DocumentKind::PatientSummary,
        DocumentContent::Insurance(_) => DocumentKind::Insurance,
        DocumentContent::Unavailable => DocumentKind::Unknown("unavailable".into()),
    }
}

fn build(kind: DocumentKind, content: DocumentContent) -> PrintableDocument {
    PrintableDocument::from_parts(DocumentParts {
        kind,
        content,
        organization: organization(),
        patient: patient(),
        issuer: issuer(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
        record_id: NonEmptyText::new("rx-1001").unwrap(),
        printed_at: printed_at(),
    })
}

/// A document whose content is read from a raw payload, as the assembler does.
pub fn document(kind: DocumentKind, payload: serde_json::Value) -> PrintableDocument {
    let content = DocumentContent::from_payload(&kind, payload);
    build(kind, content)
}

pub fn document_with(content: DocumentContent) -> PrintableDocument {
    build(kind_of(&content), content)
}
