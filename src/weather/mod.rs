pub mod dto;
pub mod handlers;
pub mod proxy;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod sun;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::weather_routes()
}
