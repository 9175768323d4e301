//! Display names for people appearing on documents.
//!
//! Every derived name (patient, issuer, prescribing doctor) goes through [`display_name`] so the
//! precedence is identical everywhere:
//!
//! 1. `title first last` when a title is set (and is not `none`) and a personal name exists
//! 2. `first last` when a personal name exists
//! 3. `username`
//! 4. `"User"`

use crate::constants::FALLBACK_DISPLAY_NAME;

/// Borrowed name fields of a person record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NameParts<'a> {
    pub title: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub username: Option<&'a str>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn display_name(parts: &NameParts<'_>) -> String {
    let personal: Vec<&str> = [parts.first_name, parts.last_name]
        .into_iter()
        .filter_map(non_blank)
        .collect();

    if !personal.is_empty() {
        let personal = personal.join(" ");
        return match non_blank(parts.title) {
            Some(title) if !title.eq_ignore_ascii_case("none") => format!("{title} {personal}"),
            _ => personal,
        };
    }

    non_blank(parts.username)
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
}

/// Upper-cases the first character and lower-cases the rest (`"DOCTOR"` -> `"Doctor"`).
pub fn capitalize(value: &str) -> String {
    let mut chars = value.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_first_last_wins_when_title_present() {
        let parts = NameParts {
            title: Some("Dr."),
            first_name: Some("Amara"),
            last_name: Some("Obi"),
            username: Some("aobi"),
        };
        assert_eq!(display_name(&parts), "Dr. Amara Obi");
    }

    #[test]
    fn title_none_is_ignored() {
        let parts = NameParts {
            title: Some("None"),
            first_name: Some("Amara"),
            last_name: Some("Obi"),
            username: None,
        };
        assert_eq!(display_name(&parts), "Amara Obi");
    }

    #[test]
    fn title_without_personal_name_falls_to_username() {
        let parts = NameParts {
            title: Some("Dr."),
            first_name: Some(""),
            last_name: Some("  "),
            username: Some("nurse_jane"),
        };
        assert_eq!(display_name(&parts), "nurse_jane");
    }

    #[test]
    fn single_personal_name_is_enough() {
        let parts = NameParts {
            last_name: Some("Okafor"),
            ..Default::default()
        };
        assert_eq!(display_name(&parts), "Okafor");
    }

    #[test]
    fn empty_record_is_user() {
        assert_eq!(display_name(&NameParts::default()), "User");
    }

    #[test]
    fn capitalize_normalises_case() {
        assert_eq!(capitalize("DOCTOR"), "Doctor");
        assert_eq!(capitalize("nurse"), "Nurse");
        assert_eq!(capitalize(""), "");
    }
}
