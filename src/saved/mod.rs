mod dto;
pub mod handlers;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/saveData", post(handlers::save_listing))
        .route("/saveData/:annonsId", post(handlers::save_listing_by_path))
        .route("/getData", get(handlers::list_saved))
}
