//! Web front-end: upload a CSV file, preview it and render charts as inline SVG.

mod handlers;
mod pages;
mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

pub use pages::{escape_html, render_page, Notice, NoticeLevel, PageView};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.config().web.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/upload", post(handlers::handle_upload))
        .route("/chart", post(handlers::handle_chart))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
