use serde::Serialize;

use crate::models::Document;

/// Document field a keyword was found in, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Description,
    Keywords,
}

impl MatchField {
    fn describe(&self) -> &'static str {
        match self {
            MatchField::Title => "title",
            MatchField::Description => "description",
            MatchField::Keywords => "keywords",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReason {
    pub keyword: String,
    pub field: MatchField,
    pub message: String,
}

impl MatchReason {
    fn new(keyword: &str, field: MatchField) -> Self {
        Self {
            keyword: keyword.to_string(),
            field,
            message: format!("Match in {}: '{}'", field.describe(), keyword),
        }
    }
}

/// Comma-separated keyword query, normalized to trimmed lower-case terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordQuery {
    keywords: Vec<String>,
}

impl KeywordQuery {
    pub fn parse(raw: &str) -> Self {
        let keywords = raw
            .split(',')
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn from_keywords(keywords: &[String]) -> Self {
        Self {
            keywords: keywords.to_vec(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// True when any keyword occurs in any searchable field. An empty query matches everything.
    pub fn matches(&self, document: &Document) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let fields = lowered_fields(document);
        self.keywords
            .iter()
            .any(|kw| fields.iter().any(|(_, text)| text.contains(kw.as_str())))
    }

    /// One reason per matching keyword, naming the first field it was found in.
    pub fn reasons(&self, document: &Document) -> Vec<MatchReason> {
        let fields = lowered_fields(document);
        self.keywords
            .iter()
            .filter_map(|kw| {
                fields
                    .iter()
                    .find(|(_, text)| text.contains(kw.as_str()))
                    .map(|(field, _)| MatchReason::new(kw, *field))
            })
            .collect()
    }
}

fn lowered_fields(document: &Document) -> [(MatchField, String); 3] {
    [
        (MatchField::Title, document.title.to_lowercase()),
        (MatchField::Description, document.description.to_lowercase()),
        (MatchField::Keywords, document.keywords.to_lowercase()),
    ]
}
