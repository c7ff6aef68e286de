use anyhow::Context;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::weather::repo_types::WeatherQuery;

pub const CSV_HEADER: [&str; 6] = ["id", "location", "start_date", "end_date", "response", "created_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Anything other than `csv` falls back to JSON.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(f) if f.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportRow {
    pub id: i64,
    pub location: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub response: String,
    pub created_at: Option<String>,
}

impl From<WeatherQuery> for ExportRow {
    fn from(q: WeatherQuery) -> Self {
        Self {
            id: q.id,
            location: q.location,
            start_date: q.start_date.map(|d| d.to_string()),
            end_date: q.end_date.map(|d| d.to_string()),
            response: q.response,
            created_at: q.created_at.format(&Rfc3339).ok(),
        }
    }
}

/// The header row is written even when there are no rows.
pub fn to_csv(rows: &[ExportRow]) -> anyhow::Result<String> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    w.write_record(CSV_HEADER).context("write csv header")?;
    for row in rows {
        w.serialize(row).context("write csv row")?;
    }
    let bytes = w.into_inner().context("flush csv")?;
    String::from_utf8(bytes).context("csv is not utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn format_parsing() {
        assert_eq!(ExportFormat::parse(Some("csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("json")), ExportFormat::Json);
        assert_eq!(ExportFormat::parse(Some("xml")), ExportFormat::Json);
        assert_eq!(ExportFormat::parse(None), ExportFormat::Json);
    }

    #[test]
    fn empty_export_is_header_only() {
        let out = to_csv(&[]).unwrap();
        assert_eq!(out, "id,location,start_date,end_date,response,created_at\n");
    }

    #[test]
    fn rows_are_quoted_and_dates_iso() {
        let row = ExportRow::from(WeatherQuery {
            id: 5,
            user_id: 1,
            location: "New York, NY".into(),
            start_date: Some(date!(2024 - 06 - 01)),
            end_date: None,
            response: r#"{"a":"b"}"#.into(),
            created_at: datetime!(2024-06-01 10:00 UTC),
        });
        let out = to_csv(&[row]).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("id,location,start_date,end_date,response,created_at"));
        assert_eq!(
            lines.next(),
            Some(r#"5,"New York, NY",2024-06-01,,"{""a"":""b""}",2024-06-01T10:00:00Z"#)
        );
    }
}
