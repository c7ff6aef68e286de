use serde_json::Value;
use tracing::debug;

use crate::weather::repo_types::WeatherQuery;

/// One row of the history page.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: i64,
    pub city: String,
    pub temp: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: String,
}

fn entry_from(id: i64, data: &Value) -> Option<HistoryEntry> {
    let (slot, city) = match data.get("list").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => (&list[0], data.get("city").and_then(|c| c.get("name"))),
        _ => (data, data.get("name")),
    };
    let main = slot.get("main")?;
    let weather = slot.get("weather")?.get(0)?;
    Some(HistoryEntry {
        id,
        city: city.and_then(Value::as_str).unwrap_or_default().to_string(),
        temp: main.get("temp")?.as_f64()?,
        humidity: main.get("humidity")?.as_f64()?,
        description: weather.get("description")?.as_str()?.to_string(),
        icon: weather.get("icon")?.as_str()?.to_string(),
    })
}

/// Forecasts are summarized by their first slot. Records that do not parse
/// or lack the fields are skipped.
pub fn summarize(records: &[WeatherQuery]) -> Vec<HistoryEntry> {
    records
        .iter()
        .filter_map(|rec| {
            let data: Value = match serde_json::from_str(&rec.response) {
                Ok(v) => v,
                Err(e) => {
                    debug!(id = rec.id, error = %e, "skipping unparsable history entry");
                    return None;
                }
            };
            entry_from(rec.id, &data)
        })
        .collect()
}
