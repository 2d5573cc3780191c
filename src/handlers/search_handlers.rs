use axum::{
    extract::{Query, RawQuery, State},
    Json,
};

use crate::{error::ApiError, forms::SearchForm, services::SearchResults, AppState};

/// Keyword and date search over active documents.
///
/// A request with any query-string parameters and a valid form is recorded
/// in the search log. An invalid form yields `errors` and unfiltered results.
pub async fn search(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(form): Query<SearchForm>,
) -> Result<Json<SearchResults>, ApiError> {
    let has_params = raw.as_deref().is_some_and(|q| !q.is_empty());
    let results = state.search_service.search(&form, has_params).await?;
    Ok(Json(results))
}
