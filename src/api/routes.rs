use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::api::handlers::{self, AppState};
use crate::store::traits::TagStore;

/// URL prefix the client assets are served under
pub const ASSETS_PATH: &str = "/admin/assets";

pub fn create_router<S: TagStore + 'static>(assets_dir: &str) -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Full page
        .route(
            "/admin/tags",
            get(handlers::get_tags_page::<S>).post(handlers::post_tags_page::<S>),
        )
        // AJAX endpoints
        .route("/admin/tags/search", get(handlers::search_tags::<S>))
        .route("/admin/tags/ajax", post(handlers::mutate_tags::<S>))
        .nest_service(ASSETS_PATH, ServeDir::new(assets_dir))
}
