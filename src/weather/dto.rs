use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct WeatherCreate {
    pub location: String,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
}

/// Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherUpdate {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub response: String,
}

/// HTML form body for creating or editing a query. Empty date inputs mean "not set".
#[derive(Debug, Deserialize)]
pub struct WeatherForm {
    pub location: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

pub(crate) fn parse_date_field(name: &str, raw: Option<&str>) -> Result<Option<Date>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| AppError::validation(format!("Invalid {} format", name))),
    }
}

impl WeatherForm {
    pub fn dates(&self) -> Result<(Option<Date>, Option<Date>), AppError> {
        Ok((
            parse_date_field("start_date", self.start_date.as_deref())?,
            parse_date_field("end_date", self.end_date.as_deref())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn create_accepts_iso_dates_and_missing_dates() {
        let c: WeatherCreate = serde_json::from_str(
            r#"{"location":"10001","start_date":"2024-06-01","end_date":"2024-06-02"}"#,
        )
        .unwrap();
        assert_eq!(c.start_date, Some(date!(2024 - 06 - 01)));
        assert_eq!(c.end_date, Some(date!(2024 - 06 - 02)));

        let c: WeatherCreate = serde_json::from_str(r#"{"location":"Seattle"}"#).unwrap();
        assert!(c.start_date.is_none() && c.end_date.is_none());
    }

    #[test]
    fn form_dates_parse_or_fail_by_name() {
        let form = WeatherForm {
            location: "Seattle".into(),
            start_date: Some("2024-06-01".into()),
            end_date: Some("".into()),
        };
        assert_eq!(form.dates().unwrap(), (Some(date!(2024 - 06 - 01)), None));

        let bad = WeatherForm {
            location: "Seattle".into(),
            start_date: None,
            end_date: Some("06/02/2024".into()),
        };
        let err = bad.dates().unwrap_err();
        assert_eq!(err.to_string(), "Invalid end_date format");
    }
}
