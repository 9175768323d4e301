use crate::constants::{AS_DIRECTED, AS_PRESCRIBED, NOT_AVAILABLE};
use crate::document::{
    FlatPrescription, FutureNeeds, MedicationLine, Prescription, PrintableDocument,
    StructuredPrescription,
};
use crate::format::display_date;
use crate::markup::{present, Block, ItemBuilder, Section, SectionBuilder};
use crate::names::{display_name, NameParts};

pub(super) fn sections(prescription: &Prescription, document: &PrintableDocument) -> Vec<Section> {
    match prescription {
        Prescription::Flat(p) => vec![flat(p, document)],
        Prescription::Structured(p) => structured(p, document),
    }
}

fn flat(p: &FlatPrescription, document: &PrintableDocument) -> Section {
    let item = ItemBuilder::new(present(p.medication_name.as_deref()).unwrap_or(NOT_AVAILABLE))
        .field("Dosage", p.dosage.as_deref(), AS_PRESCRIBED)
        .field("Frequency", p.frequency.as_deref(), AS_DIRECTED)
        .field("Duration", p.duration.as_deref(), AS_DIRECTED)
        .field(
            "Prescribed By",
            p.prescribed_by.as_deref(),
            &document.issuer().full_name,
        )
        .note(
            present(p.instructions.as_deref())
                .map(|i| format!("Instructions: {i}"))
                .as_deref(),
        )
        .build();

    SectionBuilder::new("Prescription Details").block(item).build()
}

fn medication_block(index: usize, med: &MedicationLine) -> Block {
    let name = present(med.name.as_deref()).unwrap_or(NOT_AVAILABLE);
    ItemBuilder::new(format!("Rx {}: {}", index + 1, name))
        .field("Dosage", med.dosage.as_deref(), AS_PRESCRIBED)
        .field("Frequency", med.frequency.as_deref(), AS_DIRECTED)
        .field("Duration", med.duration.as_deref(), AS_DIRECTED)
        .field_if("Route", med.route.as_deref())
        .field_if("Quantity", med.quantity.as_deref())
        .note(
            present(med.instructions.as_deref())
                .map(|i| format!("Instructions: {i}"))
                .as_deref(),
        )
        .build()
}

fn structured(p: &StructuredPrescription, document: &PrintableDocument) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(doctor) = &p.doctor {
        let name = present(doctor.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if doctor.first_name.is_none() && doctor.last_name.is_none() {
                    document.issuer().full_name.clone()
                } else {
                    display_name(&NameParts {
                        title: doctor.title.as_deref(),
                        first_name: doctor.first_name.as_deref(),
                        last_name: doctor.last_name.as_deref(),
                        username: None,
                    })
                }
            });
        sections.push(
            SectionBuilder::new("Prescribing Doctor")
                .field("Name", Some(name.as_str()), NOT_AVAILABLE)
                .field_if("Qualification", doctor.qualification.as_deref())
                .field_if("Specialization", doctor.specialization.as_deref())
                .field_if("Registration No.", doctor.registration_number.as_deref())
                .build(),
        );
    }

    if let Some(clinic) = &p.clinic {
        let builder = SectionBuilder::new("Clinic")
            .field_if("Name", clinic.name.as_deref())
            .field_if("Address", clinic.address.as_deref())
            .field_if("Phone", clinic.phone.as_deref());
        if !builder.is_empty() {
            sections.push(builder.build());
        }
    }

    if let Some(patient) = &p.patient {
        let builder = SectionBuilder::new("Patient Details")
            .field_if("Name", patient.name.as_deref())
            .field_if("Age", patient.age.as_deref())
            .field_if("Gender", patient.gender.as_deref())
            .field_if("Weight", patient.weight.as_deref());
        if !builder.is_empty() {
            sections.push(builder.build());
        }
    }

    let mut meds = SectionBuilder::new("Medications").field_if("Diagnosis", p.diagnosis.as_deref());
    if p.medications.is_empty() {
        meds = meds.block(Block::Placeholder("No medications listed.".to_string()));
    }
    for (i, med) in p.medications.iter().enumerate() {
        meds = meds.block(medication_block(i, med));
    }
    if !p.special_instructions.is_empty() {
        meds = meds.block(Block::Callout {
            heading: "Special Instructions".to_string(),
            lines: p.special_instructions.clone(),
        });
    }
    sections.push(meds.build());

    if let Some(future) = p.future_needs.as_ref().and_then(future_care) {
        sections.push(future);
    }

    sections
}

fn future_care(needs: &FutureNeeds) -> Option<Section> {
    let mut builder = SectionBuilder::new("Future Care").field_if(
        "Next Review Date",
        display_date(needs.next_review_date.as_deref()).as_deref(),
    );
    if !needs.additional_tests.is_empty() {
        builder = builder.block(Block::Callout {
            heading: "Additional Tests".to_string(),
            lines: needs.additional_tests.clone(),
        });
    }
    builder = builder.paragraph_if("Notes", needs.notes.as_deref());

    if builder.is_empty() {
        None
    } else {
        Some(builder.build())
    }
}
