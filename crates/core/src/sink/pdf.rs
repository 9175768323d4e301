//! PDF export.
//!
//! The target's [`DocumentTree`] is flattened to text lines and laid out on pages of the requested
//! format with fixed margins. Long lines are wrapped to the usable width and content flows onto
//! as many pages as needed. Every page is stamped with the organization name and page number.

use super::targets::TargetRegistry;
use super::{Export, PDF_MIME};
use crate::constants::PDF_MARGIN_MM;
use crate::filename::with_extension;
use crate::layout::PageLayout;
use crate::markup::{DocumentTree, PlainLine};
use crate::{PrintError, PrintResult};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::io::BufWriter;

const TEXT_SIZE: f32 = 9.5;
const HEADING_SIZE: f32 = 12.0;
const STAMP_SIZE: f32 = 7.0;
const TEXT_LEADING_MM: f32 = 4.6;
const HEADING_LEADING_MM: f32 = 6.5;
const GAP_MM: f32 = 3.0;
const INDENT_MM: f32 = 5.0;
/// Space kept free at the bottom of each page for the organization stamp.
const STAMP_AREA_MM: f32 = 6.0;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

/// Options for one PDF export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfOptions {
    pub filename: String,
    /// Name stamped on every page. Defaults to the letterhead name.
    pub organization: Option<String>,
    pub layout: PageLayout,
}

impl PdfOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            organization: None,
            layout: PageLayout::default(),
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Heading,
    Text,
}

/// A line placed on a page; `x` and `y` are in millimetres from the bottom-left corner.
#[derive(Clone, Debug, PartialEq)]
struct Placed {
    text: String,
    style: Style,
    x: f32,
    y: f32,
}

fn max_chars(width_mm: f32, font_size: f32) -> usize {
    let glyph_mm = font_size * PT_TO_MM * GLYPH_WIDTH_EM;
    ((width_mm / glyph_mm).floor() as usize).max(10)
}

/// Greedy word wrap. Words longer than a line are split.
fn wrap(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let len = current.chars().count();
        if len > 0 && len + 1 + word.chars().count() > max {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lays the tree out into pages of placed lines.
fn layout_pages(tree: &DocumentTree, layout: PageLayout) -> Vec<Vec<Placed>> {
    let (width, height) = layout.dimensions_mm();
    let top = height - PDF_MARGIN_MM;
    let bottom = PDF_MARGIN_MM + STAMP_AREA_MM;
    let usable_width = width - 2.0 * PDF_MARGIN_MM;

    let mut pages = vec![Vec::new()];
    let mut y = top;

    for line in tree.plain_lines() {
        let (style, indent, text, leading) = match line {
            PlainLine::Gap => {
                y -= GAP_MM;
                continue;
            }
            PlainLine::Heading(text) => (Style::Heading, 0, text, HEADING_LEADING_MM),
            PlainLine::Text { indent, text } => (Style::Text, indent, text, TEXT_LEADING_MM),
        };
        let size = match style {
            Style::Heading => HEADING_SIZE,
            Style::Text => TEXT_SIZE,
        };
        let x = PDF_MARGIN_MM + f32::from(indent) * INDENT_MM;

        for piece in wrap(&text, max_chars(usable_width - (x - PDF_MARGIN_MM), size)) {
            if y - leading < bottom {
                pages.push(Vec::new());
                y = top;
            }
            y -= leading;
            if let Some(page) = pages.last_mut() {
                page.push(Placed {
                    text: piece,
                    style,
                    x,
                    y,
                });
            }
        }
    }
    pages
}

fn pdf_error(e: impl std::fmt::Display) -> PrintError {
    PrintError::Pdf(e.to_string())
}

fn draw_page(
    layer: &PdfLayerReference,
    lines: &[Placed],
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    for line in lines {
        let (font, size) = match line.style {
            Style::Heading => (bold, HEADING_SIZE),
            Style::Text => (regular, TEXT_SIZE),
        };
        layer.use_text(line.text.as_str(), size, Mm(line.x), Mm(line.y), font);
    }
}

/// Renders a tree to PDF bytes.
pub fn tree_to_pdf(tree: &DocumentTree, options: &PdfOptions) -> PrintResult<Vec<u8>> {
    let (width, height) = options.layout.dimensions_mm();
    let organization = options
        .organization
        .as_deref()
        .unwrap_or(&tree.letterhead.name);
    let pages = layout_pages(tree, options.layout);
    let total = pages.len();

    let title = format!("{} - {}", tree.title, organization);
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    for (index, lines) in pages.iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(width), Mm(height), "Layer 1")
        };
        let layer = doc.get_page(page).get_layer(layer);
        draw_page(&layer, lines, &regular, &bold);
        layer.use_text(
            format!("{} - Page {} of {}", organization, index + 1, total),
            STAMP_SIZE,
            Mm(PDF_MARGIN_MM),
            Mm(PDF_MARGIN_MM),
            &regular,
        );
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(pdf_error)?;
    buf.into_inner().map_err(pdf_error)
}

/// Exports the target registered under `target_id` as a PDF.
pub fn export_to_pdf(
    registry: &TargetRegistry,
    target_id: &str,
    options: &PdfOptions,
) -> PrintResult<Export> {
    let guard = registry.acquire(target_id)?;
    let bytes = tree_to_pdf(guard.tree(), options)?;
    let filename = with_extension(&options.filename, "pdf");
    tracing::info!(
        target_id = guard.id(),
        filename = %filename,
        bytes = bytes.len(),
        "pdf exported"
    );
    Ok(Export {
        filename,
        mime: PDF_MIME,
        bytes,
    })
}
