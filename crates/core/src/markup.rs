//! Typed document tree shared by the HTML and PDF serializers.
//!
//! Content builders never format strings for a particular output. They describe sections, field
//! grids and item blocks; missing values are resolved here, once, through [`SectionBuilder`] and
//! [`ItemBuilder`], so no serializer ever sees an absent field.

/// Returns the trimmed value when it has visible content.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Label/value grid.
    Fields(Vec<Field>),
    /// A titled sub-block, such as one medication or one lab test.
    Item {
        heading: String,
        fields: Vec<Field>,
        note: Option<String>,
    },
    /// Highlighted box with a heading and bullet lines.
    Callout { heading: String, lines: Vec<String> },
    List(Vec<String>),
    /// Italic stand-in text for content that is absent.
    Placeholder(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub heading: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Letterhead {
    pub name: String,
    pub subtitle: String,
    pub contact_lines: Vec<String>,
    pub logo_url: Option<String>,
}

/// A complete document ready for serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTree {
    pub title: String,
    pub theme_color: String,
    pub letterhead: Letterhead,
    pub sections: Vec<Section>,
    pub signature_labels: Vec<String>,
    pub footer_lines: Vec<String>,
}

impl DocumentTree {
    /// Flattens the tree into plain text lines, used for text layouts such as PDF pages.
    pub fn plain_lines(&self) -> Vec<PlainLine> {
        let mut lines = Vec::new();
        lines.push(PlainLine::heading(&self.letterhead.name));
        lines.push(PlainLine::text(&self.letterhead.subtitle));
        for contact in &self.letterhead.contact_lines {
            lines.push(PlainLine::text(contact));
        }
        lines.push(PlainLine::Gap);
        lines.push(PlainLine::heading(&self.title));
        lines.push(PlainLine::Gap);

        for section in &self.sections {
            if let Some(heading) = &section.heading {
                lines.push(PlainLine::heading(heading));
            }
            for block in &section.blocks {
                block.push_plain_lines(&mut lines);
            }
            lines.push(PlainLine::Gap);
        }

        for label in &self.signature_labels {
            lines.push(PlainLine::Gap);
            lines.push(PlainLine::text("______________________________"));
            lines.push(PlainLine::text(label));
        }
        lines.push(PlainLine::Gap);
        for footer in &self.footer_lines {
            lines.push(PlainLine::text(footer));
        }
        lines
    }
}

/// One line of a flattened document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlainLine {
    Heading(String),
    Text { indent: u8, text: String },
    Gap,
}

impl PlainLine {
    fn heading(text: &str) -> Self {
        PlainLine::Heading(text.to_string())
    }

    fn text(text: &str) -> Self {
        PlainLine::Text {
            indent: 0,
            text: text.to_string(),
        }
    }

    fn indented(text: String) -> Self {
        PlainLine::Text { indent: 1, text }
    }
}

impl Block {
    fn push_plain_lines(&self, lines: &mut Vec<PlainLine>) {
        match self {
            Block::Fields(fields) => {
                for f in fields {
                    lines.push(PlainLine::indented(format!("{}: {}", f.label, f.value)));
                }
            }
            Block::Placeholder(text) => {
                lines.push(PlainLine::indented(text.clone()))
            }
            Block::Item {
                heading,
                fields,
                note,
            } => {
                lines.push(PlainLine::text(heading));
                for f in fields {
                    lines.push(PlainLine::indented(format!("{}: {}", f.label, f.value)));
                }
                if let Some(note) = note {
                    lines.push(PlainLine::indented(note.clone()));
                }
            }
            Block::Callout {
                heading,
                lines: items,
            } => {
                lines.push(PlainLine::text(heading));
                for item in items {
                    lines.push(PlainLine::indented(format!("- {item}")));
                }
            }
            Block::List(items) => {
                for item in items {
                    lines.push(PlainLine::indented(format!("- {item}")));
                }
            }
        }
    }
}

/// Builds a [`Section`], resolving missing values to fallbacks as fields are added.
#[derive(Debug, Default)]
pub struct SectionBuilder {
    heading: Option<String>,
    fields: Vec<Field>,
    blocks: Vec<Block>,
}

impl SectionBuilder {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            ..Default::default()
        }
    }

    pub fn untitled() -> Self {
        Self::default()
    }

    /// Adds a field that is always shown, using `fallback` when `value` is missing.
    pub fn field(mut self, label: &str, value: Option<&str>, fallback: &str) -> Self {
        self.fields.push(Field {
            label: label.to_string(),
            value: present(value).unwrap_or(fallback).to_string(),
        });
        self
    }

    /// Adds a field only when `value` is present.
    pub fn field_if(mut self, label: &str, value: Option<&str>) -> Self {
        if let Some(value) = present(value) {
            self.fields.push(Field {
                label: label.to_string(),
                value: value.to_string(),
            });
        }
        self
    }

    /// Adds a titled paragraph only when `text` is present.
    pub fn paragraph_if(self, heading: &str, text: Option<&str>) -> Self {
        match present(text) {
            Some(text) => self.block(Block::Callout {
                heading: heading.to_string(),
                lines: text
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
            }),
            None => self,
        }
    }

    /// Appends a block, flushing any pending fields first so ordering is preserved.
    pub fn block(mut self, block: Block) -> Self {
        self.flush_fields();
        self.blocks.push(block);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.blocks.is_empty()
    }

    fn flush_fields(&mut self) {
        if !self.fields.is_empty() {
            self.blocks.push(Block::Fields(std::mem::take(&mut self.fields)));
        }
    }

    pub fn build(mut self) -> Section {
        self.flush_fields();
        Section {
            heading: self.heading,
            blocks: self.blocks,
        }
    }
}

/// Builds a [`Block::Item`].
#[derive(Debug)]
pub struct ItemBuilder {
    heading: String,
    fields: Vec<Field>,
    note: Option<String>,
}

impl ItemBuilder {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            fields: Vec::new(),
            note: None,
        }
    }

    pub fn field(mut self, label: &str, value: Option<&str>, fallback: &str) -> Self {
        self.fields.push(Field {
            label: label.to_string(),
            value: present(value).unwrap_or(fallback).to_string(),
        });
        self
    }

    pub fn field_if(mut self, label: &str, value: Option<&str>) -> Self {
        if let Some(value) = present(value) {
            self.fields.push(Field {
                label: label.to_string(),
                value: value.to_string(),
            });
        }
        self
    }

    pub fn note(mut self, note: Option<&str>) -> Self {
        self.note = present(note).map(str::to_string);
        self
    }

    pub fn build(self) -> Block {
        Block::Item {
            heading: self.heading,
            fields: self.fields,
            note: self.note,
        }
    }
}
