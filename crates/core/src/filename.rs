//! Download file names.

use crate::document::PrintableDocument;
use crate::format::iso_date;
use clinic_types::FileNameComponent;
use serde::{Deserialize, Serialize};

const FALLBACK_STEM: &str = "document";

/// How an exported PDF is named.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilenameStyle {
    /// `{type}_{first}_{last}_{YYYY-MM-DD}.pdf`
    #[default]
    PatientName,
    /// `{type}-{recordId}-{YYYY-MM-DD}.pdf`
    RecordId,
}

fn components<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    parts
        .into_iter()
        .filter_map(|p| FileNameComponent::new(p).ok())
        .map(|c| c.as_str().to_string())
        .collect()
}

/// Name for the PDF export of `document`. The date is the print date.
pub fn pdf_filename(document: &PrintableDocument, style: FilenameStyle) -> String {
    let date = iso_date(document.printed_at());
    let kind = document.kind().as_str();
    let patient = document.patient();

    let parts = match style {
        FilenameStyle::PatientName => components(
            [
                Some(kind),
                patient.first_name.as_deref(),
                patient.last_name.as_deref(),
                Some(date.as_str()),
            ]
            .into_iter()
            .flatten(),
        ),
        FilenameStyle::RecordId => {
            components([kind, document.record_id().as_str(), date.as_str()])
        }
    };
    let separator = match style {
        FilenameStyle::PatientName => "_",
        FilenameStyle::RecordId => "-",
    };

    with_extension(&parts.join(separator), "pdf")
}

/// Sanitizes a caller-supplied name and makes sure it ends in `.{extension}`.
pub fn with_extension(name: &str, extension: &str) -> String {
    let suffix = format!(".{extension}");
    let trimmed = name.trim();
    let stem = if trimmed.to_ascii_lowercase().ends_with(&suffix) {
        &trimmed[..trimmed.len() - suffix.len()]
    } else {
        trimmed
    };
    let stem = FileNameComponent::new(stem)
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|_| FALLBACK_STEM.to_string());
    format!("{stem}{suffix}")
}

/// `{filename}.csv`
pub fn csv_filename(name: &str) -> String {
    with_extension(name, "csv")
}
