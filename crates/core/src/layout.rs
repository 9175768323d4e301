//! Physical page formats for printed and exported documents.

use crate::error::{PrintError, PrintResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageFormat {
    /// Portrait width and height in millimetres.
    pub fn size_mm(&self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
        }
    }

    /// Name used in the CSS `@page size` rule.
    pub fn css_name(&self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::Letter => "letter",
            PageFormat::Legal => "legal",
        }
    }
}

impl FromStr for PageFormat {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "a5" => Ok(PageFormat::A5),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            other => Err(PrintError::InvalidInput(format!(
                "unsupported page format: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn css_name(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl FromStr for Orientation {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" | "p" => Ok(Orientation::Portrait),
            "landscape" | "l" => Ok(Orientation::Landscape),
            other => Err(PrintError::InvalidInput(format!(
                "unsupported orientation: {other}"
            ))),
        }
    }
}

/// Page format and orientation together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PageLayout {
    pub fn new(format: PageFormat, orientation: Orientation) -> Self {
        Self {
            format,
            orientation,
        }
    }

    /// Width and height in millimetres after applying the orientation.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        let (w, h) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Parse an optional page format value, falling back to A4 when unset or blank.
pub fn page_format_from_env_value(value: Option<String>) -> PrintResult<PageFormat> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse an optional orientation value, falling back to portrait when unset or blank.
pub fn orientation_from_env_value(value: Option<String>) -> PrintResult<Orientation> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_swaps_dimensions() {
        let layout = PageLayout::new(PageFormat::A4, Orientation::Landscape);
        assert_eq!(layout.dimensions_mm(), (297.0, 210.0));
    }

    #[test]
    fn env_values_default_when_blank() {
        assert_eq!(page_format_from_env_value(None).unwrap(), PageFormat::A4);
        assert_eq!(
            page_format_from_env_value(Some("  ".into())).unwrap(),
            PageFormat::A4
        );
        assert_eq!(
            page_format_from_env_value(Some("Letter".into())).unwrap(),
            PageFormat::Letter
        );
        assert!(page_format_from_env_value(Some("B5".into())).is_err());
        assert_eq!(
            orientation_from_env_value(Some("landscape".into())).unwrap(),
            Orientation::Landscape
        );
    }
}
