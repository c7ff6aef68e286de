use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// A saved weather lookup owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeatherQuery {
    pub id: i64,
    pub user_id: i64,
    pub location: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub response: String, // raw provider JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields written on insert and on edit; id, owner and timestamp are fixed.
#[derive(Debug, Clone)]
pub struct QueryFields {
    pub location: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub response: String,
}
