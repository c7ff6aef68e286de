pub mod export;
pub mod handlers;
pub mod summary;
pub mod views;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::web_routes()
}
