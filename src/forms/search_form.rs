use chrono::NaiveDate;
use serde::Deserialize;

use super::{check_length, optional_date, FieldErrors};
use crate::models::KeywordQuery;

pub const QUERY_MAX_CHARS: usize = 500;

/// Query-string parameters of `/search/`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidatedSearch {
    /// The query as submitted, used for the search log.
    pub query: String,
    pub keywords: KeywordQuery,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl SearchForm {
    pub fn validate(&self) -> Result<ValidatedSearch, FieldErrors> {
        let mut errors = FieldErrors::default();

        let raw_query = self.query.as_deref().unwrap_or("").trim();
        let query = check_length(&mut errors, "query", raw_query, Some(QUERY_MAX_CHARS));
        let date_from = optional_date(&mut errors, "date_from", self.date_from.as_deref());
        let date_to = optional_date(&mut errors, "date_to", self.date_to.as_deref());

        match (query, date_from, date_to) {
            (Some(query), Ok(date_from), Ok(date_to)) if errors.is_empty() => {
                Ok(ValidatedSearch {
                    keywords: KeywordQuery::parse(&query),
                    query,
                    date_from,
                    date_to,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn raw_page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_is_valid() {
        let validated = SearchForm::default().validate().unwrap();
        assert!(validated.keywords.is_empty());
        assert!(validated.date_from.is_none());
        assert_eq!(validated.query, "");
    }

    #[test]
    fn test_parses_keywords_and_dates() {
        let form = SearchForm {
            query: Some("Harbour, boats".to_string()),
            date_from: Some("1960-01-01".to_string()),
            date_to: Some("".to_string()),
            page: Some("2".to_string()),
        };
        let validated = form.validate().unwrap();
        assert_eq!(validated.query, "Harbour, boats");
        assert_eq!(validated.keywords.keywords(), ["harbour", "boats"]);
        assert_eq!(validated.date_from, NaiveDate::from_ymd_opt(1960, 1, 1));
        assert!(validated.date_to.is_none());
        assert_eq!(form.raw_page(), Some("2"));
    }

    #[test]
    fn test_invalid_dates_and_long_query() {
        let form = SearchForm {
            query: Some("k".repeat(501)),
            date_from: Some("yesterday".to_string()),
            date_to: Some("2001-02-30".to_string()),
            page: None,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field_names(), vec!["date_from", "date_to", "query"]);
    }
}
