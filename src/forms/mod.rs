//! Validated inputs for the document and search forms.
//!
//! Every form collects all of its field errors before returning, so a client
//! sees each invalid field in one response.

pub mod document_form;
pub mod login_form;
pub mod search_form;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use document_form::{DocumentEditForm, DocumentForm, UploadedFile, ValidatedDocument};
pub use login_form::{safe_next, LoginForm};
pub use search_form::{SearchForm, ValidatedSearch};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Enter a valid date.";

/// Field name to error messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_chars: Option<usize>,
) -> Option<String> {
    let Some(value) = non_blank(value) else {
        errors.add(field, REQUIRED);
        return None;
    };
    check_length(errors, field, value, max_chars)
}

pub(crate) fn check_length(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_chars: Option<usize>,
) -> Option<String> {
    let chars = value.chars().count();
    match max_chars {
        Some(max) if chars > max => {
            errors.add(
                field,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, chars
                ),
            );
            None
        }
        _ => Some(value.to_string()),
    }
}

/// Blank input is `Ok(None)`; anything else must be `YYYY-MM-DD`.
pub(crate) fn optional_date(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ()> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                errors.add(field, INVALID_DATE);
                Err(())
            }
        },
    }
}

pub(crate) fn required_date(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<NaiveDate> {
    match optional_date(errors, field, value) {
        Ok(Some(date)) => Some(date),
        Ok(None) => {
            errors.add(field, REQUIRED);
            None
        }
        Err(()) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collects_per_field() {
        let mut errors = FieldErrors::default();
        assert!(errors.is_empty());

        errors.add("title", REQUIRED);
        errors.add("original_date", INVALID_DATE);
        errors.add("title", "Too long.");

        assert_eq!(errors.field_names(), vec!["original_date", "title"]);
        assert_eq!(errors.get("title").unwrap().len(), 2);
        assert_eq!(
            errors.to_string(),
            "original_date: Enter a valid date.; title: This field is required. Too long."
        );
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut errors = FieldErrors::default();
        errors.add("query", "bad");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value, serde_json::json!({ "query": ["bad"] }));
    }

    #[test]
    fn test_date_helpers() {
        let mut errors = FieldErrors::default();
        assert_eq!(optional_date(&mut errors, "d", Some("  ")), Ok(None));
        assert_eq!(
            optional_date(&mut errors, "d", Some("1961-04-12")),
            Ok(NaiveDate::from_ymd_opt(1961, 4, 12))
        );
        assert!(errors.is_empty());

        assert!(required_date(&mut errors, "a", None).is_none());
        assert!(required_date(&mut errors, "b", Some("12.04.1961")).is_none());
        assert_eq!(errors.get("a").unwrap(), [REQUIRED]);
        assert_eq!(errors.get("b").unwrap(), [INVALID_DATE]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut errors = FieldErrors::default();
        let cyrillic = "я".repeat(200);
        assert!(check_length(&mut errors, "title", &cyrillic, Some(200)).is_some());
        assert!(check_length(&mut errors, "title", &"x".repeat(201), Some(200)).is_none());
        assert_eq!(
            errors.get("title").unwrap(),
            ["Ensure this value has at most 200 characters (it has 201)."]
        );
    }
}
