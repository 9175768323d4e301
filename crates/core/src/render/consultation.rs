use crate::constants::CONTENT_NOT_AVAILABLE;
use crate::document::Consultation;
use crate::format::humanize_key;
use crate::markup::{Block, Section, SectionBuilder};
use serde_json::Value;

/// Display text for one form value. `None` for values a form leaves unfilled: null, false, zero,
/// blank strings and empty collections.
fn form_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("Yes".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(form_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(k, v)| form_value(v).map(|v| format!("{}: {}", humanize_key(k), v)))
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
    }
}

pub(super) fn sections(consultation: &Consultation) -> Vec<Section> {
    let mut builder = SectionBuilder::new("Consultation Details")
        .field_if("Consultation Type", consultation.consultation_type.as_deref());

    for (key, value) in &consultation.form_data {
        if let Some(text) = form_value(value) {
            builder = builder.field_if(&humanize_key(key), Some(text.as_str()));
        }
    }

    builder = builder
        .paragraph_if("Diagnosis", consultation.diagnosis.as_deref())
        .paragraph_if("Treatment Plan", consultation.treatment_plan.as_deref());

    if builder.is_empty() {
        builder = builder.block(Block::Placeholder(CONTENT_NOT_AVAILABLE.to_string()));
    }
    vec![builder.build()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;
    use crate::markup::Field;
    use crate::render::document_tree;
    use crate::test_support::document;
    use serde_json::json;

    fn field(label: &str, value: &str) -> Field {
        Field {
            label: label.into(),
            value: value.into(),
        }
    }

    #[test]
    fn form_fields_keep_order_and_skip_blank_values() {
        let tree = document_tree(&document(
            DocumentKind::Consultation,
            json!({
                "consultationType": "Follow-up",
                "formData": {
                    "chiefComplaint": "Headache",
                    "blood_pressure": "120/80",
                    "symptoms": ["nausea", "", "dizziness"],
                    "smoker": false,
                    "painScore": 0,
                    "temperature": 37.5,
                    "referral": null,
                    "vitals": {"pulse": 72, "spo2": ""}
                },
                "diagnosis": "Tension headache",
                "treatmentPlan": "Rest\nHydration"
            }),
        ));
        let section = &tree.sections[2];
        assert_eq!(section.heading.as_deref(), Some("Consultation Details"));

        let Block::Fields(fields) = &section.blocks[0] else {
            panic!("expected field grid first");
        };
        assert_eq!(
            fields,
            &vec![
                field("Consultation Type", "Follow-up"),
                field("Chief Complaint", "Headache"),
                field("Blood pressure", "120/80"),
                field("Symptoms", "nausea, dizziness"),
                field("Temperature", "37.5"),
                field("Vitals", "Pulse: 72"),
            ]
        );
        assert_eq!(
            section.blocks[2],
            Block::Callout {
                heading: "Treatment Plan".into(),
                lines: vec!["Rest".into(), "Hydration".into()]
            }
        );
    }

    #[test]
    fn empty_consultation_renders_placeholder() {
        let sections = sections(&Consultation::default());
        assert_eq!(
            sections[0].blocks,
            vec![Block::Placeholder(CONTENT_NOT_AVAILABLE.to_string())]
        );
    }

    #[test]
    fn true_checkbox_reads_as_yes() {
        assert_eq!(form_value(&json!(true)).as_deref(), Some("Yes"));
        assert_eq!(form_value(&json!([])), None);
        assert_eq!(form_value(&json!("  ")), None);
    }
}
