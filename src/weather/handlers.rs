use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ForecastResponse, WeatherCreate, WeatherUpdate},
    repo::load_owned,
    repo_types::WeatherQuery,
    services,
    sun::SunTimes,
};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

pub fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(list_weather).post(create_weather))
        .route(
            "/weather/:id",
            get(read_weather).put(update_weather).delete(delete_weather),
        )
        .route("/weather/:id/sun", get(get_sun_times))
        .route("/weather/:id/forecast", get(get_saved_forecast))
}

#[instrument(skip(state, user, payload))]
pub async fn create_weather(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<WeatherCreate>,
) -> Result<Response, AppError> {
    let rec = services::create_query(&state, user.id, payload).await?;
    let location = format!("/weather/{}", rec.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(rec)).into_response())
}

#[instrument(skip(state, user))]
pub async fn list_weather(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<WeatherQuery>>, AppError> {
    Ok(Json(WeatherQuery::list_by_user(&state.db, user.id).await?))
}

#[instrument(skip(state, user))]
pub async fn read_weather(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<WeatherQuery>, AppError> {
    Ok(Json(load_owned(&state.db, id, user.id).await?))
}

#[instrument(skip(state, user, payload))]
pub async fn update_weather(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<WeatherUpdate>,
) -> Result<Json<WeatherQuery>, AppError> {
    Ok(Json(services::update_query(&state, user.id, id, payload).await?))
}

#[instrument(skip(state, user))]
pub async fn delete_weather(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete_query(&state, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user))]
pub async fn get_sun_times(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<SunTimes>, AppError> {
    Ok(Json(services::sun_times(&state, user.id, id).await?))
}

#[instrument(skip(state, user))]
pub async fn get_saved_forecast(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ForecastResponse>, AppError> {
    let response = services::full_forecast(&state, user.id, id).await?;
    Ok(Json(ForecastResponse { response }))
}
