//! Upstream weather lookups: range rules, endpoint choice and forecast trimming.

use serde_json::Value;
use time::{macros::format_description, Date};
use tracing::{info, warn};

use crate::{
    config::WeatherConfig,
    error::AppError,
    upstream::{QueryParams, UpstreamClient},
};

/// Free-tier forecasts cover five days.
pub const MAX_RANGE_DAYS: i64 = 5;
/// Column width of `weather_requests.location`.
pub const MAX_LOCATION_LEN: usize = 255;

const PROVIDER_ERROR: &str = "Location not found or provider error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn url(self, cfg: &WeatherConfig) -> String {
        match self {
            Endpoint::Current => cfg.current_url(),
            Endpoint::Forecast => cfg.forecast_url(),
        }
    }
}

pub fn validate_range(start: Option<Date>, end: Option<Date>) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(AppError::validation(
                "start_date must be on or before end_date",
            ));
        }
        if (end - start).whole_days() > MAX_RANGE_DAYS {
            return Err(AppError::validation(format!(
                "Date range cannot exceed {} days",
                MAX_RANGE_DAYS
            )));
        }
    }
    Ok(())
}

/// Forecast only when both dates are set and at least a day apart.
pub fn select_endpoint(start: Option<Date>, end: Option<Date>) -> Endpoint {
    match (start, end) {
        (Some(s), Some(e)) if (e - s).whole_days() >= 1 => Endpoint::Forecast,
        _ => Endpoint::Current,
    }
}

fn is_postal_code(location: &str) -> bool {
    let compact: String = location.chars().filter(|c| *c != ' ').collect();
    !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit())
}

/// Numeric locations go out as `zip`, everything else as `q`, both scoped to the country.
pub fn location_params(cfg: &WeatherConfig, location: &str) -> QueryParams {
    let key = if is_postal_code(location) { "zip" } else { "q" };
    vec![
        ("appid", cfg.api_key.clone()),
        ("units", cfg.units.clone()),
        (key, format!("{},{}", location, cfg.country)),
    ]
}

fn slot_date(slot: &Value) -> Option<Date> {
    let stamp = slot.get("dt_txt")?.as_str()?;
    Date::parse(stamp.get(..10)?, format_description!("[year]-[month]-[day]")).ok()
}

/// Keeps the forecast slots dated within `[start, end]`. Slots without a
/// readable `dt_txt` are dropped. An empty result is not an error.
pub fn filter_forecast(body: &str, start: Date, end: Date) -> Result<String, AppError> {
    let mut data: Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "forecast body is not json");
        AppError::Upstream(PROVIDER_ERROR.into())
    })?;
    let obj = data
        .as_object_mut()
        .ok_or_else(|| AppError::Upstream(PROVIDER_ERROR.into()))?;

    let kept: Vec<Value> = obj
        .get("list")
        .and_then(Value::as_array)
        .map(|slots| {
            slots
                .iter()
                .filter(|slot| slot_date(slot).is_some_and(|d| start <= d && d <= end))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    obj.insert("list".into(), Value::Array(kept));

    serde_json::to_string(&data).map_err(|e| AppError::Internal(e.into()))
}

async fn call(
    client: &dyn UpstreamClient,
    url: &str,
    params: &QueryParams,
    failure: &str,
) -> Result<String, AppError> {
    match client.get(url, params).await {
        Ok(resp) if resp.is_success() => Ok(resp.body),
        Ok(resp) => {
            warn!(%url, status = resp.status, "upstream rejected request");
            Err(AppError::Upstream(failure.into()))
        }
        Err(e) => {
            warn!(%url, error = %e, "upstream call failed");
            Err(AppError::Upstream(failure.into()))
        }
    }
}

/// Fetches weather for `location` and returns the text to store.
pub async fn fetch_weather(
    client: &dyn UpstreamClient,
    cfg: &WeatherConfig,
    location: &str,
    start: Option<Date>,
    end: Option<Date>,
) -> Result<String, AppError> {
    if location.trim().is_empty() {
        return Err(AppError::validation("location must not be empty"));
    }
    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(AppError::validation(format!(
            "location must be at most {MAX_LOCATION_LEN} characters"
        )));
    }
    validate_range(start, end)?;

    let endpoint = select_endpoint(start, end);
    let params = location_params(cfg, location);
    let body = call(client, &endpoint.url(cfg), &params, PROVIDER_ERROR).await?;
    info!(%location, ?endpoint, "weather fetched");

    match (endpoint, start, end) {
        (Endpoint::Forecast, Some(s), Some(e)) => filter_forecast(&body, s, e),
        _ => Ok(body),
    }
}

/// Full, unfiltered five-day forecast for a saved location.
pub async fn refresh_forecast(
    client: &dyn UpstreamClient,
    cfg: &WeatherConfig,
    location: &str,
) -> Result<String, AppError> {
    let params = location_params(cfg, location);
    call(client, &cfg.forecast_url(), &params, "Forecast API error").await
}
