use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::handlers::{decode_url, encode_url, list_urls, url_stats, AppState};

pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/encode", post(encode_url))
        .route("/decode", get(decode_url))
        .route("/list", get(list_urls))
        .route("/statistic/{code}", get(url_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
