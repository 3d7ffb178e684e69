use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    db::WatchStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
};

pub mod profile;
pub mod shows;
pub mod watchlist;

/// Shared handler state
pub struct AppState {
    pub store: Arc<dyn WatchStore>,
    pub public_base_url: String,
    pub refresh_interval: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn WatchStore>, config: &Config) -> Self {
        Self {
            store,
            public_base_url: config.public_base_url.clone(),
            refresh_interval: config.refresh_interval(),
        }
    }
}

/// Title filter shared by the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog
        .route("/shows", get(shows::list).post(shows::create))
        .route("/shows/:id/rating", put(shows::rate))
        // Profile
        .route("/profile", get(profile::get).post(profile::create))
        // Own watchlist
        .route("/watchlist", get(watchlist::mine).post(watchlist::add))
        .route("/watchlist/share", get(watchlist::share))
        .route("/watchlist/:show_id", delete(watchlist::remove))
        // Shared watchlists
        .route("/watchlists/:username", get(watchlist::public))
        .route("/watchlists/:username/live", get(watchlist::live))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
