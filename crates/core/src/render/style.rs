//! Inline stylesheet for rendered documents.

use crate::constants::DEFAULT_THEME_COLOR;
use crate::layout::PageLayout;

/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` or a plain CSS colour keyword; anything else falls back
/// to the default theme colour so organization data can never break out of the stylesheet.
pub fn sanitize_color(color: &str) -> &str {
    let color = color.trim();
    let is_hex = matches!(color.len(), 4 | 7 | 9)
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    let is_keyword = !color.is_empty()
        && color.len() <= 20
        && color.chars().all(|c| c.is_ascii_alphabetic());

    if is_hex || is_keyword {
        color
    } else {
        DEFAULT_THEME_COLOR
    }
}

pub fn stylesheet(layout: PageLayout, theme_color: &str) -> String {
    let theme = sanitize_color(theme_color);
    let (width_mm, _) = layout.dimensions_mm();

    format!(
        r#"@page {{ size: {format} {orientation}; margin: 15mm; }}
* {{ box-sizing: border-box; }}
body {{ font-family: "Helvetica Neue", Arial, sans-serif; font-size: 13px; color: #1f2937; margin: 0; }}
.document {{ max-width: {width_mm}mm; margin: 0 auto; padding: 24px; }}
.letterhead {{ border-bottom: 3px solid {theme}; padding-bottom: 12px; margin-bottom: 16px; text-align: center; }}
.letterhead .logo {{ max-height: 60px; margin-bottom: 8px; }}
.letterhead h1 {{ color: {theme}; font-size: 24px; margin: 0; }}
.letterhead .org-type {{ text-transform: uppercase; letter-spacing: 1px; font-size: 11px; color: #6b7280; margin: 4px 0; }}
.letterhead .contact {{ font-size: 12px; margin: 2px 0; }}
.title-banner {{ background: {theme}; color: #ffffff; text-align: center; padding: 8px; margin-bottom: 16px; }}
.title-banner h2 {{ margin: 0; font-size: 18px; letter-spacing: 2px; }}
.section {{ margin-bottom: 16px; }}
.section h3 {{ color: {theme}; border-bottom: 1px solid #e5e7eb; padding-bottom: 4px; font-size: 15px; margin: 0 0 8px; }}
.field-grid {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 6px 16px; margin-bottom: 8px; }}
.field .label {{ font-weight: bold; color: #374151; }}
.item {{ border-left: 4px solid {theme}; background: #f9fafb; padding: 8px 12px; margin-bottom: 10px; }}
.item h4 {{ margin: 0 0 6px; font-size: 14px; }}
.item-note {{ font-style: italic; margin: 4px 0 0; }}
.callout {{ border: 1px solid #fcd34d; background: #fffbeb; padding: 8px 12px; margin-bottom: 10px; }}
.callout h4 {{ margin: 0 0 4px; font-size: 13px; }}
.callout ul, .list {{ margin: 4px 0; padding-left: 20px; }}
.placeholder {{ font-style: italic; color: #6b7280; }}
.signatures {{ display: flex; justify-content: space-between; margin-top: 48px; }}
.signature {{ width: 40%; text-align: center; }}
.signature-line {{ border-top: 1px solid #111827; margin-bottom: 4px; height: 1px; }}
footer {{ margin-top: 32px; border-top: 1px solid #e5e7eb; padding-top: 8px; font-size: 11px; color: #6b7280; text-align: center; }}
footer p {{ margin: 2px 0; }}
@media print {{
  body {{ font-size: 11px; }}
  .document {{ padding: 0; max-width: none; }}
  .letterhead h1 {{ font-size: 20px; }}
  .title-banner {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }}
  .section {{ page-break-inside: avoid; }}
}}
"#,
        format = layout.format.css_name(),
        orientation = layout.orientation.css_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Orientation, PageFormat};

    #[test]
    fn sanitize_color_rejects_css_injection() {
        assert_eq!(sanitize_color("#0f766e"), "#0f766e");
        assert_eq!(sanitize_color("teal"), "teal");
        assert_eq!(sanitize_color("red; } body { display:none"), DEFAULT_THEME_COLOR);
        assert_eq!(sanitize_color("#12345"), DEFAULT_THEME_COLOR);
        assert_eq!(sanitize_color(""), DEFAULT_THEME_COLOR);
    }

    #[test]
    fn stylesheet_uses_page_format() {
        let css = stylesheet(
            PageLayout::new(PageFormat::Letter, Orientation::Landscape),
            "#000000",
        );
        assert!(css.contains("size: letter landscape"));
        assert!(css.contains("@media print"));
    }
}
