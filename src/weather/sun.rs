//! Sunrise/sunset lookup for the coordinates embedded in a stored response.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::{config::WeatherConfig, error::AppError, upstream::UpstreamClient};

const SUN_API_ERROR: &str = "Sun API error";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunTimes {
    pub sunrise: String,
    pub sunset: String,
}

/// `coord` at the top level (current conditions) or under `city` (forecast).
pub fn extract_coordinates(stored: &str) -> Result<(f64, f64), AppError> {
    let data: Value = serde_json::from_str(stored).map_err(|e| {
        warn!(error = %e, "stored response is not json");
        AppError::MissingCoordinates
    })?;

    let coord = data
        .get("coord")
        .filter(|c| c.as_object().is_some_and(|o| !o.is_empty()))
        .or_else(|| data.get("city").and_then(|c| c.get("coord")))
        .ok_or(AppError::MissingCoordinates)?;

    let lat = coord.get("lat").and_then(Value::as_f64);
    let lon = coord.get("lon").and_then(Value::as_f64);
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(AppError::MissingCoordinates),
    }
}

fn timestamp(results: &Value, key: &str) -> Option<String> {
    match results.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub async fn fetch_sun_times(
    client: &dyn UpstreamClient,
    cfg: &WeatherConfig,
    stored: &str,
) -> Result<SunTimes, AppError> {
    let (lat, lon) = extract_coordinates(stored)?;
    let params = vec![
        ("lat", lat.to_string()),
        ("lng", lon.to_string()),
        ("formatted", "0".to_string()),
    ];

    let resp = client.get(&cfg.sun_api_url, &params).await.map_err(|e| {
        warn!(error = %e, "sun api call failed");
        AppError::Upstream(SUN_API_ERROR.into())
    })?;
    if !resp.is_success() {
        warn!(status = resp.status, "sun api rejected request");
        return Err(AppError::Upstream(SUN_API_ERROR.into()));
    }

    let body: Value = serde_json::from_str(&resp.body)
        .map_err(|_| AppError::Upstream(SUN_API_ERROR.into()))?;
    let Some(results) = body.get("results") else {
        return Err(AppError::Upstream(SUN_API_ERROR.into()));
    };
    match (timestamp(results, "sunrise"), timestamp(results, "sunset")) {
        (Some(sunrise), Some(sunset)) => Ok(SunTimes { sunrise, sunset }),
        _ => Err(AppError::Upstream(SUN_API_ERROR.into())),
    }
}
