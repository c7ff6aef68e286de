use time::Date;
use tracing::{info, instrument};

use super::{
    dto::{WeatherCreate, WeatherUpdate},
    proxy,
    repo::load_owned,
    repo_types::{QueryFields, WeatherQuery},
    sun::{self, SunTimes},
};
use crate::{error::AppError, state::AppState};

async fn fetch_fields(
    state: &AppState,
    location: String,
    start_date: Option<Date>,
    end_date: Option<Date>,
) -> Result<QueryFields, AppError> {
    let response = proxy::fetch_weather(
        state.upstream.as_ref(),
        &state.config.weather,
        &location,
        start_date,
        end_date,
    )
    .await?;
    Ok(QueryFields {
        location,
        start_date,
        end_date,
        response,
    })
}

#[instrument(skip(state, input), fields(location = %input.location))]
pub async fn create_query(
    state: &AppState,
    user_id: i64,
    input: WeatherCreate,
) -> Result<WeatherQuery, AppError> {
    let location = input.location.trim().to_string();
    let fields = fetch_fields(state, location, input.start_date, input.end_date).await?;
    let rec = WeatherQuery::create(&state.db, user_id, &fields).await?;
    info!(id = rec.id, user_id, "weather query saved");
    Ok(rec)
}

/// Location, start and end after applying `patch` to `rec`.
pub(crate) fn merge_update(
    rec: &WeatherQuery,
    patch: WeatherUpdate,
) -> (String, Option<Date>, Option<Date>) {
    let location = patch
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| rec.location.clone());
    (
        location,
        patch.start_date.or(rec.start_date),
        patch.end_date.or(rec.end_date),
    )
}

/// Re-fetches upstream so the stored response matches the new parameters.
#[instrument(skip(state, patch))]
pub async fn update_query(
    state: &AppState,
    user_id: i64,
    id: i64,
    patch: WeatherUpdate,
) -> Result<WeatherQuery, AppError> {
    let rec = load_owned(&state.db, id, user_id).await?;
    let (location, start_date, end_date) = merge_update(&rec, patch);
    let fields = fetch_fields(state, location, start_date, end_date).await?;

    let updated = WeatherQuery::update(&state.db, id, user_id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(id, user_id, "weather query updated");
    Ok(updated)
}

#[instrument(skip(state))]
pub async fn delete_query(state: &AppState, user_id: i64, id: i64) -> Result<(), AppError> {
    load_owned(&state.db, id, user_id).await?;
    if !WeatherQuery::delete(&state.db, id, user_id).await? {
        return Err(AppError::NotFound);
    }
    info!(id, user_id, "weather query deleted");
    Ok(())
}

#[instrument(skip(state))]
pub async fn sun_times(state: &AppState, user_id: i64, id: i64) -> Result<SunTimes, AppError> {
    let rec = load_owned(&state.db, id, user_id).await?;
    sun::fetch_sun_times(state.upstream.as_ref(), &state.config.weather, &rec.response).await
}

#[instrument(skip(state))]
pub async fn full_forecast(state: &AppState, user_id: i64, id: i64) -> Result<String, AppError> {
    let rec = load_owned(&state.db, id, user_id).await?;
    proxy::refresh_forecast(state.upstream.as_ref(), &state.config.weather, &rec.location).await
}
