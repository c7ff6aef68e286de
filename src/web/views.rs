//! Askama pages for the browser flow. Every `{{ }}` is HTML-escaped.

use anyhow::Context;
use askama::Template;
use axum::response::Html;
use time::Date;

use super::summary::HistoryEntry;
use crate::{auth::repo_types::User, error::AppError, weather::repo_types::WeatherQuery};

#[derive(Template, Default)]
#[template(path = "welcome.html")]
pub struct WelcomePage {
    user_email: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "login.html")]
pub struct LoginPage {
    user_email: Option<String>,
    email: String,
}

#[derive(Template, Default)]
#[template(path = "register.html")]
pub struct RegisterPage {
    user_email: Option<String>,
    email: String,
}

#[derive(Template)]
#[template(path = "new_query.html")]
pub struct NewQueryPage {
    user_email: Option<String>,
    location: String,
    start_date: String,
    end_date: String,
}

#[derive(Template)]
#[template(path = "edit_query.html")]
pub struct EditQueryPage {
    user_email: Option<String>,
    id: i64,
    location: String,
    start_date: String,
    end_date: String,
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryPage {
    user_email: Option<String>,
    entries: Vec<HistoryEntry>,
}

fn date_value(d: Option<Date>) -> String {
    d.map(|d| d.to_string()).unwrap_or_default()
}

impl NewQueryPage {
    pub fn new(user: &User) -> Self {
        Self {
            user_email: Some(user.email.clone()),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

impl EditQueryPage {
    pub fn new(user: &User, rec: &WeatherQuery) -> Self {
        Self {
            user_email: Some(user.email.clone()),
            id: rec.id,
            location: rec.location.clone(),
            start_date: date_value(rec.start_date),
            end_date: date_value(rec.end_date),
        }
    }
}

impl HistoryPage {
    pub fn new(user: &User, entries: Vec<HistoryEntry>) -> Self {
        Self {
            user_email: Some(user.email.clone()),
            entries,
        }
    }
}

pub fn render(page: &impl Template) -> Result<Html<String>, AppError> {
    let html = page.render().context("render page")?;
    Ok(Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};

    fn user() -> User {
        User {
            id: 1,
            email: "<b>@x.io".into(),
            password_hash: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn entry(city: &str) -> HistoryEntry {
        HistoryEntry {
            id: 3,
            city: city.into(),
            temp: 1.0,
            humidity: 2.0,
            description: "rain".into(),
            icon: "10d".into(),
        }
    }

    #[test]
    fn edit_form_escapes_stored_location() {
        let rec = WeatherQuery {
            id: 9,
            user_id: 1,
            location: r#"<a href="x">&'"#.into(),
            start_date: Some(date!(2024 - 06 - 01)),
            end_date: None,
            response: "{}".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let html = EditQueryPage::new(&user(), &rec).render().unwrap();
        assert!(html.contains("&lt;a href=&quot;x&quot;&gt;&amp;"));
        assert!(!html.contains(r#"<a href="x">"#));
        assert!(html.contains(r#"action="/history/9/edit""#));
        assert!(html.contains(r#"value="2024-06-01""#));
    }

    #[test]
    fn history_escapes_provider_text() {
        let html = HistoryPage::new(&user(), vec![entry("<script>")])
            .render()
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;@x.io"));
        assert!(html.contains("/history/3/edit"));
        assert!(html.contains("Log out"));
    }

    #[test]
    fn empty_history_has_placeholder() {
        let html = HistoryPage::new(&user(), Vec::new()).render().unwrap();
        assert!(html.contains("No saved queries yet."));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn anonymous_pages_offer_login() {
        for html in [
            WelcomePage::default().render().unwrap(),
            LoginPage::default().render().unwrap(),
            RegisterPage::default().render().unwrap(),
        ] {
            assert!(html.contains(r#"href="/login""#));
            assert!(!html.contains("Log out"));
        }
    }
}
