//! HTML serialization of a [`DocumentTree`].

use super::style;
use crate::layout::PageLayout;
use crate::markup::{Block, DocumentTree, Field, Section};
use std::fmt::Write;

/// Script that opens the platform print dialog once the document has loaded.
const AUTO_PRINT_SCRIPT: &str = "window.onload = function () { window.print(); };";

/// Escapes text for use in HTML element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_safe_image_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://") || url.starts_with("http://") || url.starts_with("data:image/")
}

/// Serializes a tree into a complete, self-contained HTML document.
pub fn to_html(tree: &DocumentTree, layout: PageLayout) -> String {
    let mut out = String::with_capacity(8 * 1024);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(
        out,
        "<title>{} - {}</title>",
        escape(&tree.title),
        escape(&tree.letterhead.name)
    );
    out.push_str("<style>\n");
    out.push_str(&style::stylesheet(layout, &tree.theme_color));
    out.push_str("</style>\n</head>\n<body>\n<div class=\"document\">\n");

    write_letterhead(&mut out, tree);
    let _ = writeln!(
        out,
        "<div class=\"title-banner\"><h2>{}</h2></div>",
        escape(&tree.title)
    );
    for section in &tree.sections {
        write_section(&mut out, section);
    }
    write_signatures(&mut out, &tree.signature_labels);

    out.push_str("<footer>\n");
    for line in &tree.footer_lines {
        let _ = writeln!(out, "<p>{}</p>", escape(line));
    }
    out.push_str("</footer>\n</div>\n");

    let _ = writeln!(out, "<script>{AUTO_PRINT_SCRIPT}</script>");
    out.push_str("</body>\n</html>\n");
    out
}

fn write_letterhead(out: &mut String, tree: &DocumentTree) {
    let head = &tree.letterhead;
    out.push_str("<header class=\"letterhead\">\n");
    if let Some(logo) = head.logo_url.as_deref().filter(|u| is_safe_image_url(u)) {
        let _ = writeln!(
            out,
            "<img class=\"logo\" src=\"{}\" alt=\"{}\">",
            escape(logo.trim()),
            escape(&head.name)
        );
    }
    let _ = writeln!(out, "<h1>{}</h1>", escape(&head.name));
    let _ = writeln!(out, "<p class=\"org-type\">{}</p>", escape(&head.subtitle));
    for line in &head.contact_lines {
        let _ = writeln!(out, "<p class=\"contact\">{}</p>", escape(line));
    }
    out.push_str("</header>\n");
}

fn write_fields(out: &mut String, fields: &[Field]) {
    if fields.is_empty() {
        return;
    }
    out.push_str("<div class=\"field-grid\">\n");
    for field in fields {
        let _ = writeln!(
            out,
            "<div class=\"field\"><span class=\"label\">{}:</span> <span class=\"value\">{}</span></div>",
            escape(&field.label),
            escape(&field.value)
        );
    }
    out.push_str("</div>\n");
}

fn write_list(out: &mut String, class: Option<&str>, items: &[String]) {
    match class {
        Some(class) => {
            let _ = writeln!(out, "<ul class=\"{class}\">");
        }
        None => out.push_str("<ul>\n"),
    }
    for item in items {
        let _ = writeln!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>\n");
}

fn write_section(out: &mut String, section: &Section) {
    out.push_str("<section class=\"section\">\n");
    if let Some(heading) = &section.heading {
        let _ = writeln!(out, "<h3>{}</h3>", escape(heading));
    }
    for block in &section.blocks {
        match block {
            Block::Fields(fields) => write_fields(out, fields),
            Block::Item {
                heading,
                fields,
                note,
            } => {
                out.push_str("<div class=\"item\">\n");
                let _ = writeln!(out, "<h4>{}</h4>", escape(heading));
                write_fields(out, fields);
                if let Some(note) = note {
                    let _ = writeln!(out, "<p class=\"item-note\">{}</p>", escape(note));
                }
                out.push_str("</div>\n");
            }
            Block::Callout { heading, lines } => {
                out.push_str("<div class=\"callout\">\n");
                let _ = writeln!(out, "<h4>{}</h4>", escape(heading));
                write_list(out, None, lines);
                out.push_str("</div>\n");
            }
            Block::List(items) => write_list(out, Some("list"), items),
            Block::Placeholder(text) => {
                let _ = writeln!(out, "<p class=\"placeholder\">{}</p>", escape(text));
            }
        }
    }
    out.push_str("</section>\n");
}

fn write_signatures(out: &mut String, labels: &[String]) {
    if labels.is_empty() {
        return;
    }
    out.push_str("<div class=\"signatures\">\n");
    for label in labels {
        let _ = writeln!(
            out,
            "<div class=\"signature\"><div class=\"signature-line\"></div><span>{}</span></div>",
            escape(label)
        );
    }
    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{Letterhead, SectionBuilder};

    fn tree() -> DocumentTree {
        DocumentTree {
            title: "PRESCRIPTION".into(),
            theme_color: "#0f766e".into(),
            letterhead: Letterhead {
                name: "Grace & Mercy Clinic".into(),
                subtitle: "Clinic".into(),
                contact_lines: vec!["12 Marina Road".into()],
                logo_url: Some("javascript:alert(1)".into()),
            },
            sections: vec![SectionBuilder::new("Notes")
                .field("Dosage", Some("<b>500mg</b>"), "N/A")
                .build()],
            signature_labels: vec!["Provider Signature".into(), "Date".into()],
            footer_lines: vec!["Printed on March 5, 2024".into()],
        }
    }

    #[test]
    fn escapes_text_content() {
        assert_eq!(escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
        let html = to_html(&tree(), PageLayout::default());
        assert!(html.contains("Grace &amp; Mercy Clinic"));
        assert!(html.contains("&lt;b&gt;500mg&lt;/b&gt;"));
        assert!(!html.contains("<b>500mg</b>"));
    }

    #[test]
    fn document_is_complete_and_auto_prints() {
        let html = to_html(&tree(), PageLayout::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("window.print()"));
        assert!(html.trim_end().ends_with("</html>"));
        assert_eq!(html.matches("<div class=\"signature-line\">").count(), 2);
    }

    #[test]
    fn unsafe_logo_urls_are_dropped() {
        let html = to_html(&tree(), PageLayout::default());
        assert!(!html.contains("javascript:"));

        let mut with_logo = tree();
        with_logo.letterhead.logo_url = Some("https://cdn.example/logo.png".into());
        assert!(to_html(&with_logo, PageLayout::default())
            .contains("<img class=\"logo\" src=\"https://cdn.example/logo.png\""));
    }
}
