use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{
    export::{self, ExportFormat, ExportRow},
    summary::summarize,
    views::{self, EditQueryPage, HistoryPage, LoginPage, NewQueryPage, RegisterPage, WelcomePage},
};
use crate::{
    auth::{
        dto::Credentials,
        extractors::{AuthUser, MaybeUser, SESSION_COOKIE},
        repo_types::User,
        services,
    },
    error::AppError,
    state::AppState,
    weather::{
        dto::{WeatherCreate, WeatherForm, WeatherUpdate},
        repo::load_owned,
        repo_types::WeatherQuery,
        services as weather_services,
    },
};

pub fn web_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/history", get(history_page))
        .route("/register", get(register_page).post(register_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/weather-ui", get(weather_page).post(weather_submit))
        .route("/history/:id/edit", get(edit_page).post(edit_submit))
        .route("/history/:id/delete", post(delete_entry))
        .route("/export", get(export_data))
}

fn to_login() -> Response {
    Redirect::to("/login").into_response()
}

async fn render_history(state: &AppState, user: &User) -> Result<Response, AppError> {
    let records = WeatherQuery::list_by_user(&state.db, user.id).await?;
    let entries = summarize(&records);
    Ok(views::render(&HistoryPage::new(user, entries))?.into_response())
}

#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, AppError> {
    match user {
        Some(user) => render_history(&state, &user).await,
        None => Ok(views::render(&WelcomePage::default())?.into_response()),
    }
}

#[instrument(skip_all)]
pub async fn history_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, AppError> {
    match user {
        Some(user) => render_history(&state, &user).await,
        None => Ok(to_login()),
    }
}

pub async fn register_page(MaybeUser(user): MaybeUser) -> Result<Response, AppError> {
    match user {
        Some(_) => Ok(Redirect::to("/").into_response()),
        None => Ok(views::render(&RegisterPage::default())?.into_response()),
    }
}

#[instrument(skip(state, form))]
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<Credentials>,
) -> Result<Redirect, AppError> {
    services::register(&state, &form.email, &form.password).await?;
    Ok(Redirect::to("/login"))
}

pub async fn login_page(MaybeUser(user): MaybeUser) -> Result<Response, AppError> {
    match user {
        Some(_) => Ok(Redirect::to("/").into_response()),
        None => Ok(views::render(&LoginPage::default())?.into_response()),
    }
}

#[instrument(skip(state, jar, form))]
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<Credentials>,
) -> Result<(CookieJar, Redirect), AppError> {
    let (_, token) = services::login(&state, &form.email, &form.password).await?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((jar.add(cookie), Redirect::to("/")))
}

#[instrument(skip_all)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    info!("session cleared");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

pub async fn weather_page(MaybeUser(user): MaybeUser) -> Result<Response, AppError> {
    match user {
        Some(user) => Ok(views::render(&NewQueryPage::new(&user))?.into_response()),
        None => Ok(to_login()),
    }
}

#[instrument(skip(state, user, form))]
pub async fn weather_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<WeatherForm>,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(to_login());
    };
    let (start_date, end_date) = form.dates()?;
    weather_services::create_query(
        &state,
        user.id,
        WeatherCreate {
            location: form.location,
            start_date,
            end_date,
        },
    )
    .await?;
    Ok(Redirect::to("/history").into_response())
}

#[instrument(skip(state, user))]
pub async fn edit_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(to_login());
    };
    let rec = load_owned(&state.db, id, user.id).await?;
    Ok(views::render(&EditQueryPage::new(&user, &rec))?.into_response())
}

#[instrument(skip(state, user, form))]
pub async fn edit_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
    Form(form): Form<WeatherForm>,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(to_login());
    };
    let (start_date, end_date) = form.dates()?;
    weather_services::update_query(
        &state,
        user.id,
        id,
        WeatherUpdate {
            location: Some(form.location),
            start_date,
            end_date,
        },
    )
    .await?;
    Ok(Redirect::to("/history").into_response())
}

#[instrument(skip(state, user))]
pub async fn delete_entry(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(to_login());
    };
    weather_services::delete_query(&state, user.id, id).await?;
    Ok(Redirect::to("/history").into_response())
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

#[instrument(skip(state, user))]
pub async fn export_data(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let rows: Vec<ExportRow> = WeatherQuery::list_by_user(&state.db, user.id)
        .await?
        .into_iter()
        .map(ExportRow::from)
        .collect();

    match ExportFormat::parse(params.format.as_deref()) {
        ExportFormat::Csv => {
            let body = export::to_csv(&rows)?;
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=weather_export.csv",
                    ),
                ],
                body,
            )
                .into_response())
        }
        ExportFormat::Json => Ok(Json(rows).into_response()),
    }
}
