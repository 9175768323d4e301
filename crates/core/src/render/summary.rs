//! Patient-summary and insurance content.

use crate::constants::{NONE_RECORDED, NOT_AVAILABLE};
use crate::document::{InsurancePolicy, PatientSummary, PrintableDocument, SummaryMedication};
use crate::format::{display_date, expiry_status, format_currency, parse_date};
use crate::markup::{present, Block, Section, SectionBuilder};

const DEFAULT_CURRENCY: &str = "USD";

fn list_or_none(heading: &str, items: &[String]) -> Section {
    let items: Vec<String> = items
        .iter()
        .filter_map(|i| present(Some(i.as_str())))
        .map(str::to_string)
        .collect();
    let block = if items.is_empty() {
        Block::Placeholder(NONE_RECORDED.to_string())
    } else {
        Block::List(items)
    };
    SectionBuilder::new(heading).block(block).build()
}

fn medication_line(med: &SummaryMedication) -> Option<String> {
    match med {
        SummaryMedication::Name(name) => present(Some(name.as_str())).map(str::to_string),
        SummaryMedication::Detailed(line) => {
            let name = present(line.name.as_deref())?;
            let detail: Vec<&str> = [line.dosage.as_deref(), line.frequency.as_deref()]
                .into_iter()
                .filter_map(present)
                .collect();
            Some(if detail.is_empty() {
                name.to_string()
            } else {
                format!("{} ({})", name, detail.join(", "))
            })
        }
    }
}

pub(super) fn patient_summary_sections(summary: &PatientSummary) -> Vec<Section> {
    let medications: Vec<String> = summary
        .current_medications
        .iter()
        .filter_map(medication_line)
        .collect();

    let overview = SectionBuilder::new("Medical Summary")
        .field("Blood Group", summary.blood_group.as_deref(), NOT_AVAILABLE)
        .build();

    let notes = match present(summary.notes.as_deref()) {
        Some(_) => SectionBuilder::untitled()
            .paragraph_if("Notes", summary.notes.as_deref())
            .build(),
        None => SectionBuilder::new("Notes")
            .block(Block::Placeholder(NONE_RECORDED.to_string()))
            .build(),
    };

    vec![
        overview,
        list_or_none("Allergies", &summary.allergies),
        list_or_none("Chronic Conditions", &summary.chronic_conditions),
        list_or_none("Current Medications", &medications),
        notes,
    ]
}

pub(super) fn insurance_sections(
    policy: &InsurancePolicy,
    document: &PrintableDocument,
) -> Vec<Section> {
    let currency = present(policy.currency.as_deref()).unwrap_or(DEFAULT_CURRENCY);
    let amount = policy.coverage_amount.map(|a| format_currency(a, currency));
    let holder = present(policy.holder_name.as_deref())
        .unwrap_or(document.patient().full_name.as_str());

    let today = document.printed_at().date_naive();
    let expiry = policy.expiry_date.as_deref().and_then(parse_date);
    let status = expiry_status(expiry, today).label();

    vec![
        SectionBuilder::new("Coverage")
            .field("Provider", policy.provider.as_deref(), NOT_AVAILABLE)
            .field("Policy Number", policy.policy_number.as_deref(), NOT_AVAILABLE)
            .field_if("Group Number", policy.group_number.as_deref())
            .field("Policy Holder", Some(holder), NOT_AVAILABLE)
            .field("Coverage Type", policy.coverage_type.as_deref(), NOT_AVAILABLE)
            .field_if("Coverage Amount", amount.as_deref())
            .build(),
        SectionBuilder::new("Validity")
            .field(
                "Start Date",
                display_date(policy.start_date.as_deref()).as_deref(),
                NOT_AVAILABLE,
            )
            .field(
                "Expiry Date",
                display_date(policy.expiry_date.as_deref()).as_deref(),
                NOT_AVAILABLE,
            )
            .field("Status", Some(status.as_str()), NOT_AVAILABLE)
            .build(),
    ]
}
