use serde::Serialize;
use std::num::IntErrorKind;
use std::sync::Arc;

use crate::{
    error::ApiError,
    forms::{FieldErrors, SearchForm, ValidatedSearch},
    models::{DocumentFilter, DocumentView, MatchReason, SearchLogCreate},
    repositories::{DocumentRepository, SearchLogRepository},
};

/// One page of a result set. There is always at least one page, possibly empty.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// Non-integers select the first page; out-of-range numbers clamp to the nearest page.
    pub fn page_number(&self, raw: Option<&str>, total: usize) -> usize {
        let last = self.num_pages(total);
        let Some(raw) = raw.map(str::trim) else {
            return 1;
        };
        match raw.parse::<i64>() {
            Ok(n) if n < 1 => 1,
            Ok(n) => usize::try_from(n).map_or(last, |n| n.min(last)),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => last,
            Err(_) => 1,
        }
    }

    pub fn page<T>(&self, items: Vec<T>, raw: Option<&str>) -> Page<T> {
        let total = items.len();
        let num_pages = self.num_pages(total);
        let number = self.page_number(raw, total);
        let items = items
            .into_iter()
            .skip((number - 1) * self.per_page)
            .take(self.per_page)
            .collect();

        Page {
            items,
            number,
            num_pages,
            per_page: self.per_page,
            total,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: DocumentView,
    pub reasons: Vec<MatchReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub page: Page<SearchHit>,
    pub documents_count: usize,
    /// Present when the form was invalid; the results are then unfiltered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

pub struct SearchService {
    document_repo: Arc<dyn DocumentRepository + Send + Sync>,
    search_log_repo: Arc<dyn SearchLogRepository + Send + Sync>,
    paginator: Paginator,
}

impl SearchService {
    pub fn new(
        document_repo: Arc<dyn DocumentRepository + Send + Sync>,
        search_log_repo: Arc<dyn SearchLogRepository + Send + Sync>,
        per_page: usize,
    ) -> Self {
        Self {
            document_repo,
            search_log_repo,
            paginator: Paginator::new(per_page),
        }
    }

    /// Runs a search over active documents.
    ///
    /// `has_params` tells whether the request carried any query-string
    /// parameters; only then is a valid search written to the search log.
    pub async fn search(
        &self,
        form: &SearchForm,
        has_params: bool,
    ) -> Result<SearchResults, ApiError> {
        let (validated, errors) = match form.validate() {
            Ok(validated) => (Some(validated), None),
            Err(errors) => (None, Some(errors)),
        };

        let filter = match &validated {
            Some(v) => DocumentFilter {
                keywords: v.keywords.keywords().to_vec(),
                date_from: v.date_from,
                date_to: v.date_to,
                ..DocumentFilter::active()
            },
            None => DocumentFilter::active(),
        };

        let documents = self.document_repo.list(&filter).await?;
        let documents_count = documents.len();

        if let (Some(v), true) = (&validated, has_params) {
            self.log_search(v, documents_count).await?;
        }

        let hits = documents
            .into_iter()
            .map(|document| {
                let reasons = validated
                    .as_ref()
                    .map(|v| v.keywords.reasons(&document))
                    .unwrap_or_default();
                SearchHit {
                    document: DocumentView::from(document),
                    reasons,
                }
            })
            .collect();

        Ok(SearchResults {
            page: self.paginator.page(hits, form.raw_page()),
            documents_count,
            errors,
        })
    }

    async fn log_search(&self, search: &ValidatedSearch, results: usize) -> Result<(), ApiError> {
        let results_count = i32::try_from(results).unwrap_or(i32::MAX);
        self.search_log_repo
            .create(&SearchLogCreate {
                query: search.query.clone(),
                date_from: search.date_from,
                date_to: search.date_to,
                results_count,
            })
            .await?;

        tracing::info!(
            query = %search.query,
            date_from = ?search.date_from,
            date_to = ?search.date_to,
            results_count,
            "search executed"
        );
        Ok(())
    }
}
