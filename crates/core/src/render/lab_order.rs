use crate::constants::{NOT_AVAILABLE, NO_LAB_TESTS};
use crate::document::{LabOrder, LabTest};
use crate::markup::{present, Block, ItemBuilder, Section, SectionBuilder};
use crate::names::capitalize;

fn test_block(index: usize, test: &LabTest) -> Block {
    let name = present(test.name.as_deref()).unwrap_or(NOT_AVAILABLE);
    ItemBuilder::new(format!("{}. {}", index + 1, name))
        .field_if("Code", test.code.as_deref())
        .field_if("Category", test.category.as_deref())
        .field_if("Description", test.description.as_deref())
        .note(
            present(test.instructions.as_deref())
                .map(|i| format!("Instructions: {i}"))
                .as_deref(),
        )
        .build()
}

pub(super) fn sections(order: &LabOrder) -> Vec<Section> {
    let mut builder = SectionBuilder::new("Tests Ordered").field_if(
        "Priority",
        order.priority.as_deref().map(capitalize).as_deref(),
    );

    if order.tests.is_empty() {
        builder = builder.block(Block::Placeholder(NO_LAB_TESTS.to_string()));
    }
    for (i, test) in order.tests.iter().enumerate() {
        builder = builder.block(test_block(i, test));
    }

    vec![builder
        .paragraph_if("Instructions", order.instructions.as_deref())
        .paragraph_if("Notes", order.notes.as_deref())
        .build()]
}

#[cfg(test)]
mod tests {
    use crate::document::DocumentKind;
    use crate::markup::Block;
    use crate::render::{document_tree, render};
    use crate::test_support::document;
    use serde_json::json;

    #[test]
    fn empty_test_list_renders_literal_text() {
        let html = render(&document(DocumentKind::LabOrder, json!({"tests": []})));
        assert!(html.contains("No laboratory tests ordered."));

        let html = render(&document(DocumentKind::LabOrder, json!({"tests": null})));
        assert!(html.contains("No laboratory tests ordered."));
        assert!(!html.contains("Content not available."));
    }

    #[test]
    fn tests_are_numbered_with_optional_details() {
        let tree = document_tree(&document(
            DocumentKind::LabOrder,
            json!({
                "priority": "urgent",
                "tests": [
                    {"name": "Full Blood Count", "category": "Hematology"},
                    {"name": "Lipid Panel", "description": "Fasting", "instructions": "No food for 12 hours"}
                ],
                "notes": "Call with results"
            }),
        ));
        let section = &tree.sections[2];

        let items: Vec<_> = section
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Item { heading, note, .. } => Some((heading.clone(), note.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                ("1. Full Blood Count".to_string(), None),
                (
                    "2. Lipid Panel".to_string(),
                    Some("Instructions: No food for 12 hours".to_string())
                ),
            ]
        );
        assert!(matches!(section.blocks.first(), Some(Block::Fields(f)) if f[0].value == "Urgent"));
        assert!(matches!(
            section.blocks.last(),
            Some(Block::Callout { heading, .. }) if heading == "Notes"
        ));
    }
}
