use anyhow::Context;
use sqlx::PgPool;
use tracing::debug;

use super::repo_types::{QueryFields, WeatherQuery};
use crate::error::AppError;

impl WeatherQuery {
    pub async fn create(db: &PgPool, user_id: i64, f: &QueryFields) -> anyhow::Result<WeatherQuery> {
        let row = sqlx::query_as::<_, WeatherQuery>(
            r#"
            INSERT INTO weather_requests (user_id, location, start_date, end_date, response)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, location, start_date, end_date, response, created_at
            "#,
        )
        .bind(user_id)
        .bind(&f.location)
        .bind(f.start_date)
        .bind(f.end_date)
        .bind(&f.response)
        .fetch_one(db)
        .await
        .context("insert weather request")?;
        Ok(row)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<WeatherQuery>> {
        let row = sqlx::query_as::<_, WeatherQuery>(
            r#"
            SELECT id, user_id, location, start_date, end_date, response, created_at
            FROM weather_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get weather request")?;
        Ok(row)
    }

    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<WeatherQuery>> {
        let rows = sqlx::query_as::<_, WeatherQuery>(
            r#"
            SELECT id, user_id, location, start_date, end_date, response, created_at
            FROM weather_requests
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list weather requests")?;
        Ok(rows)
    }

    /// Single statement, so every field changes together or not at all.
    pub async fn update(
        db: &PgPool,
        id: i64,
        user_id: i64,
        f: &QueryFields,
    ) -> anyhow::Result<Option<WeatherQuery>> {
        let row = sqlx::query_as::<_, WeatherQuery>(
            r#"
            UPDATE weather_requests
               SET location = $3, start_date = $4, end_date = $5, response = $6
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, location, start_date, end_date, response, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&f.location)
        .bind(f.start_date)
        .bind(f.end_date)
        .bind(&f.response)
        .fetch_optional(db)
        .await
        .context("update weather request")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: i64, user_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM weather_requests WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete weather request")?;
        Ok(res.rows_affected() > 0)
    }
}

/// Absent and foreign-owned records are indistinguishable to the caller.
pub(crate) fn ensure_owner(rec: Option<WeatherQuery>, user_id: i64) -> Result<WeatherQuery, AppError> {
    match rec {
        Some(r) if r.user_id == user_id => Ok(r),
        Some(r) => {
            debug!(id = r.id, owner = r.user_id, user_id, "foreign record requested");
            Err(AppError::NotFound)
        }
        None => Err(AppError::NotFound),
    }
}

pub async fn load_owned(db: &PgPool, id: i64, user_id: i64) -> Result<WeatherQuery, AppError> {
    ensure_owner(WeatherQuery::find_by_id(db, id).await?, user_id)
}
