use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only record of one executed search.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SearchLog {
    pub id: i64,
    pub query: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search_date: DateTime<Utc>,
    pub results_count: i32,
}

#[derive(Debug, Clone)]
pub struct SearchLogCreate {
    pub query: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub results_count: i32,
}
