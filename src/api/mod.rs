use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::pipeline::QaPipeline;

pub mod handlers;
pub mod models;

pub fn create_router(pipeline: Arc<QaPipeline>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/stackoverflow/search", get(handlers::search_handler))
        .route("/search", get(handlers::search_handler))
        .route("/faq/ask", post(handlers::ask_handler))
        .route("/ask", post(handlers::ask_handler))
        .with_state(pipeline)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
